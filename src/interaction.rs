//! Pointer, wheel and touch handling for a [`Plot`].
//!
//! The host decodes its own input events and calls the `on_*` methods of the plot. Each handler
//! returns whether the plot used the event, so that the host can skip its default behaviour.
use crate::{plot::Plot, Lim};
use piet::kurbo::Point;

/// A pointer button. Wheel events count as [`Button::Center`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Button {
    Left,
    Center,
    Right,
}

/// The key held down during an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Modifier {
    None,
    Shift,
    Control,
    Alt,
}

impl Modifier {
    /// When several keys are held down, alt wins over control, and control over shift.
    pub fn from_keys(alt: bool, ctrl: bool, shift: bool) -> Self {
        if alt {
            Modifier::Alt
        } else if ctrl {
            Modifier::Control
        } else if shift {
            Modifier::Shift
        } else {
            Modifier::None
        }
    }
}

/// A button together with a modifier key.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Gesture {
    pub button: Button,
    pub modifier: Modifier,
}

impl Gesture {
    pub const fn new(button: Button, modifier: Modifier) -> Self {
        Gesture { button, modifier }
    }

    /// A button with no modifier.
    pub const fn button(button: Button) -> Self {
        Gesture::new(button, Modifier::None)
    }
}

impl From<Button> for Gesture {
    fn from(button: Button) -> Self {
        Gesture::button(button)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Zooming {
    factor: f64,
    increase: Gesture,
    decrease: Gesture,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Pinch {
    distance: f64,
    screen: Point,
}

/// Which interactions are active, and the state of the one in progress.
#[derive(Debug, Clone, Default)]
pub(crate) struct Interaction {
    zooming: Option<Zooming>,
    centering: Option<Gesture>,
    panning: Option<Gesture>,
    labeling: Option<Gesture>,
    reset: Option<Gesture>,

    // retained
    reset_lim: Option<(Lim, Lim)>,
    /// The value held under the pointer while panning.
    panning_ref: Option<(f64, f64)>,
    /// Where the pointer is while labeling.
    labeling_pos: Option<Point>,
    pinch: Option<Pinch>,
}

impl Plot {
    /// Zoom in by `factor` with the `increase` gesture and out with `decrease`.
    ///
    /// A factor that is not positive keeps the previous one (1.3 by default).
    pub fn activate_zooming(&mut self, factor: f64, increase: Gesture, decrease: Gesture) {
        let prev = self.interaction.zooming.map_or(1.3, |z| z.factor);
        let factor = if factor > 0. {
            factor
        } else {
            log::warn!("ignoring zoom factor {}", factor);
            prev
        };
        self.interaction.zooming = Some(Zooming {
            factor,
            increase,
            decrease,
        });
    }

    /// Zoom by 1.3, in with the left button and out with the right one.
    pub fn activate_default_zooming(&mut self) {
        self.activate_zooming(1.3, Button::Left.into(), Button::Right.into());
    }

    pub fn deactivate_zooming(&mut self) {
        self.interaction.zooming = None;
        self.interaction.pinch = None;
    }

    /// Center the plot on the clicked position.
    pub fn activate_centering(&mut self, gesture: Gesture) {
        self.interaction.centering = Some(gesture);
    }

    pub fn deactivate_centering(&mut self) {
        self.interaction.centering = None;
    }

    /// Drag the plot around.
    pub fn activate_panning(&mut self, gesture: Gesture) {
        self.interaction.panning = Some(gesture);
    }

    pub fn deactivate_panning(&mut self) {
        self.interaction.panning = None;
        self.interaction.panning_ref = None;
    }

    /// Show the labels of the points under the pointer while the gesture is held.
    pub fn activate_point_labels(&mut self, gesture: Gesture) {
        self.interaction.labeling = Some(gesture);
    }

    pub fn deactivate_point_labels(&mut self) {
        self.interaction.labeling = None;
        self.interaction.labeling_pos = None;
    }

    /// Go back to the limits from before the first zoom, centering or pan.
    pub fn activate_reset(&mut self, gesture: Gesture) {
        self.interaction.reset = Some(gesture);
        self.interaction.reset_lim = None;
    }

    pub fn deactivate_reset(&mut self) {
        self.interaction.reset = None;
        self.interaction.reset_lim = None;
    }

    /// The screen position to draw point labels at, while labeling is in progress.
    pub fn labeling_pos(&self) -> Option<Point> {
        self.interaction
            .labeling
            .and(self.interaction.labeling_pos)
    }

    fn save_reset_limits(&mut self) {
        let lims = (self.x_lim(), self.y_lim());
        let ia = &mut self.interaction;
        if ia.reset.is_some() && ia.reset_lim.is_none() {
            ia.reset_lim = Some(lims);
        }
    }

    /// Zoom in or out if `gesture` is one of the zooming gestures.
    fn zoom_gesture(&mut self, gesture: Gesture, screen: Point, allow: (bool, bool)) -> bool {
        let zooming = match self.interaction.zooming {
            Some(zooming) => zooming,
            None => return false,
        };
        let factor = if allow.0 && gesture == zooming.increase {
            zooming.factor
        } else if allow.1 && gesture == zooming.decrease {
            1. / zooming.factor
        } else {
            return false;
        };
        self.save_reset_limits();
        self.zoom_at(factor, screen);
        true
    }

    pub fn on_click(&mut self, screen: Point, button: Button, modifier: Modifier) -> bool {
        if !self.is_over_box(screen) {
            return false;
        }
        log::trace!("click at {:?} with {:?} {:?}", screen, button, modifier);
        let gesture = Gesture::new(button, modifier);
        let mut used = self.zoom_gesture(gesture, screen, (true, true));
        if self.interaction.centering == Some(gesture) {
            self.save_reset_limits();
            self.center(screen);
            used = true;
        }
        if self.interaction.reset == Some(gesture) {
            if let Some((x_lim, y_lim)) = self.interaction.reset_lim.take() {
                self.set_x_lim(x_lim);
                self.set_y_lim(y_lim);
                used = true;
            }
        }
        used
    }

    /// Scrolling down (`delta_y > 0`) zooms in, scrolling up zooms out.
    pub fn on_wheel(&mut self, delta_y: f64, screen: Point, modifier: Modifier) -> bool {
        if !self.is_over_box(screen) {
            return false;
        }
        log::trace!("wheel {} at {:?} with {:?}", delta_y, screen, modifier);
        let gesture = Gesture::new(Button::Center, modifier);
        self.zoom_gesture(gesture, screen, (delta_y > 0., delta_y < 0.))
    }

    /// Start panning or labeling.
    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifier: Modifier) -> bool {
        if !self.is_over_box(screen) {
            return false;
        }
        log::trace!("pointer down at {:?} with {:?} {:?}", screen, button, modifier);
        let gesture = Some(Gesture::new(button, modifier));
        let mut used = false;
        if self.interaction.panning == gesture {
            self.save_reset_limits();
            self.interaction.panning_ref = Some(self.value_at(screen));
            used = true;
        }
        if self.interaction.labeling == gesture {
            self.interaction.labeling_pos = Some(screen);
            used = true;
        }
        used
    }

    /// Follow the pointer while panning or labeling.
    pub fn on_pointer_move(&mut self, screen: Point) -> bool {
        let mut used = false;
        if let Some(value) = self.interaction.panning_ref {
            self.align(value, screen);
            used = true;
        }
        if self.interaction.labeling_pos.is_some() {
            self.interaction.labeling_pos = Some(screen);
            used = true;
        }
        used
    }

    pub fn on_pointer_up(&mut self) -> bool {
        let panning = self.interaction.panning_ref.take().is_some();
        let labeling = self.interaction.labeling_pos.take().is_some();
        panning || labeling
    }

    /// Start panning, labeling or (with two fingers) pinch zooming. The first touch acts as the
    /// pointer.
    pub fn on_touch_start(&mut self, touches: &[Point]) -> bool {
        let screen = match touches.first() {
            Some(&screen) if self.is_over_box(screen) => screen,
            _ => return false,
        };
        log::trace!("touch start with {} touches", touches.len());
        let mut used = false;
        if self.interaction.panning.is_some() {
            self.save_reset_limits();
            self.interaction.panning_ref = Some(self.value_at(screen));
            used = true;
        }
        if self.interaction.labeling.is_some() {
            self.interaction.labeling_pos = Some(screen);
            used = true;
        }
        if let (Some(_), [a, b]) = (self.interaction.zooming, touches) {
            self.save_reset_limits();
            self.interaction.pinch = Some(Pinch {
                distance: a.distance(*b),
                screen,
            });
            used = true;
        }
        used
    }

    pub fn on_touch_move(&mut self, touches: &[Point]) -> bool {
        let screen = match touches.first() {
            Some(&screen) => screen,
            None => return false,
        };
        let mut used = self.on_pointer_move(screen);
        if let (Some(pinch), [a, b]) = (self.interaction.pinch, touches) {
            let distance = a.distance(*b);
            if pinch.distance > 0. && distance > 0. {
                self.zoom_at(distance / pinch.distance, pinch.screen);
            }
            self.interaction.pinch = Some(Pinch { distance, ..pinch });
            used = true;
        }
        used
    }

    pub fn on_touch_end(&mut self) -> bool {
        let pinch = self.interaction.pinch.take().is_some();
        self.on_pointer_up() || pinch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::MAIN_LAYER_ID;
    use piet::kurbo::Vec2;

    fn plot() -> Plot {
        let mut plot = Plot::default();
        plot.set_x_lim(Lim::new(0., 10.));
        plot.set_y_lim(Lim::new(0., 10.));
        plot
    }

    fn assert_lim(lim: Lim, lo: f64, hi: f64) {
        assert!(
            (lim.lo() - lo).abs() < 1e-9 && (lim.hi() - hi).abs() < 1e-9,
            "{:?} != {}..{}",
            lim,
            lo,
            hi
        );
    }

    #[test]
    fn modifier_priority() {
        assert_eq!(Modifier::from_keys(true, true, true), Modifier::Alt);
        assert_eq!(Modifier::from_keys(false, true, true), Modifier::Control);
        assert_eq!(Modifier::from_keys(false, false, true), Modifier::Shift);
        assert_eq!(Modifier::from_keys(false, false, false), Modifier::None);
    }

    #[test]
    fn click_zoom_and_reset() {
        let mut plot = plot();
        let center = plot.screen_pos_at_value(5., 5.);
        // inactive
        assert!(!plot.on_click(center, Button::Left, Modifier::None));

        plot.activate_zooming(2., Button::Left.into(), Button::Right.into());
        plot.activate_reset(Gesture::new(Button::Right, Modifier::Control));
        assert!(plot.on_click(center, Button::Left, Modifier::None));
        assert_lim(plot.x_lim(), 2.5, 7.5);
        assert!(plot.on_click(center, Button::Left, Modifier::None));
        assert_lim(plot.x_lim(), 3.75, 6.25);
        // wrong modifier
        assert!(!plot.on_click(center, Button::Left, Modifier::Shift));
        // outside the box
        assert!(!plot.on_click(Point::ZERO, Button::Left, Modifier::None));

        assert!(plot.on_click(center, Button::Right, Modifier::Control));
        assert_lim(plot.x_lim(), 0., 10.);
        assert_lim(plot.y_lim(), 0., 10.);
        // nothing saved any more
        assert!(!plot.on_click(center, Button::Right, Modifier::Control));
    }

    #[test]
    fn wheel_direction() {
        let mut plot = plot();
        plot.activate_zooming(
            2.,
            Button::Center.into(),
            Gesture::new(Button::Center, Modifier::None),
        );
        let center = plot.screen_pos_at_value(5., 5.);
        assert!(!plot.on_wheel(0., center, Modifier::None));
        assert!(plot.on_wheel(1., center, Modifier::None));
        assert_lim(plot.x_lim(), 2.5, 7.5);
        assert!(plot.on_wheel(-1., center, Modifier::None));
        assert_lim(plot.x_lim(), 0., 10.);
        assert!(!plot.on_wheel(-1., center, Modifier::Alt));
    }

    #[test]
    fn centering() {
        let mut plot = plot();
        plot.activate_centering(Gesture::new(Button::Left, Modifier::Shift));
        let target = plot.screen_pos_at_value(8., 2.);
        assert!(plot.on_click(target, Button::Left, Modifier::Shift));
        assert_lim(plot.x_lim(), 3., 13.);
        assert_lim(plot.y_lim(), -3., 7.);
    }

    #[test]
    fn dragging() {
        let mut plot = plot();
        plot.activate_panning(Button::Left.into());
        plot.activate_point_labels(Button::Left.into());
        let start = plot.screen_pos_at_value(5., 5.);
        assert!(!plot.on_pointer_move(start));
        assert!(plot.on_pointer_down(start, Button::Left, Modifier::None));
        assert_eq!(plot.labeling_pos(), Some(start));

        // 35 pixels is a tenth of the width
        let end = start + Vec2::new(35., 0.);
        assert!(plot.on_pointer_move(end));
        assert_lim(plot.x_lim(), -1., 9.);
        assert_eq!(plot.labeling_pos(), Some(end));

        assert!(plot.on_pointer_up());
        assert!(!plot.on_pointer_up());
        assert_eq!(plot.labeling_pos(), None);
        assert!(!plot.on_pointer_move(start));
        assert_lim(plot.x_lim(), -1., 9.);
    }

    #[test]
    fn pinch_zoom() {
        let mut plot = plot();
        plot.activate_default_zooming();
        let center = plot.screen_pos_at_value(5., 5.);
        let far = center + Vec2::new(10., 0.);
        assert!(plot.on_touch_start(&[center, far]));
        // fingers twice as far apart
        assert!(plot.on_touch_move(&[center, center + Vec2::new(20., 0.)]));
        assert_lim(plot.x_lim(), 2.5, 7.5);
        assert!(plot.on_touch_end());
        assert!(!plot.on_touch_move(&[center, far]));
        assert!(!plot.on_touch_start(&[]));
    }

    #[test]
    fn deactivation() {
        let mut plot = plot();
        plot.add_point(MAIN_LAYER_ID, Point::new(1., 1.).into());
        plot.activate_default_zooming();
        plot.activate_panning(Button::Left.into());
        plot.deactivate_zooming();
        plot.deactivate_panning();
        let center = plot.screen_pos_at_value(5., 5.);
        assert!(!plot.on_click(center, Button::Left, Modifier::None));
        assert!(!plot.on_pointer_down(center, Button::Left, Modifier::None));
        assert!(!plot.on_touch_start(&[center]));
        assert_lim(plot.x_lim(), 0., 10.);
    }
}
