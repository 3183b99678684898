use anyhow::{anyhow, Result};
use grafica::{
    Button, ContourType, Gesture, GridLines, HAlign, HistogramType, Lim, LogScale, Modifier, Plot,
    Point, VAlign, MAIN_LAYER_ID,
};
use piet::{kurbo, Color, NullRenderContext};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal, Uniform};

/// `piet::Error` can hold a backend error that is not `Send`, so it goes through its message.
fn drawing(res: Result<(), piet::Error>) -> Result<()> {
    res.map_err(|e| anyhow!("drawing failed: {}", e))
}

fn random_points(rng: &mut StdRng, n: usize, dist: &impl Distribution<f64>) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let (x, y) = (dist.sample(rng), dist.sample(rng));
            Point::with_label(x, y, format!("point {}", i))
        })
        .collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.)
}

#[test]
fn limits_fit_every_layer() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut plot = Plot::default();
    let normal = Normal::new(5., 2.)?;
    plot.set_points(MAIN_LAYER_ID, random_points(&mut rng, 200, &normal));
    assert!(plot.add_layer_with_points(
        "uniform",
        random_points(&mut rng, 50, &Uniform::new(-20., 0.))
    ));

    let all: Vec<Point> = plot
        .main_layer()
        .points()
        .iter()
        .chain(plot.layers()[0].points())
        .cloned()
        .collect();
    let x_min = all.iter().map(Point::x).fold(f64::INFINITY, f64::min);
    let x_max = all.iter().map(Point::x).fold(f64::NEG_INFINITY, f64::max);
    let delta = 0.1 * (x_max - x_min);
    assert!(close(plot.x_lim().lo(), x_min - delta));
    assert!(close(plot.x_lim().hi(), x_max + delta));

    // every layer shares the limits, and every point fits
    for layer in std::iter::once(plot.main_layer()).chain(plot.layers()) {
        assert_eq!(layer.x_lim(), plot.x_lim());
        assert_eq!(layer.y_lim(), plot.y_lim());
        assert!(layer.inside().iter().all(|&inside| inside));
    }

    // leaving the other layers out refits to the main one
    plot.set_include_all_layers_in_lim(false);
    assert!(plot.x_lim().lo() > -20.);
    assert!(plot.layers()[0].inside().iter().any(|&inside| !inside));
    Ok(())
}

#[test]
fn expansion_of_a_fixed_range() -> Result<()> {
    let mut plot = Plot::default();
    plot.set_points(
        MAIN_LAYER_ID,
        vec![Point::new(2., 2.), Point::new(5., 3.), Point::new(8., 8.)],
    );
    assert!((plot.x_lim().lo() - 1.4).abs() < 1e-12);
    assert!((plot.x_lim().hi() - 8.6).abs() < 1e-12);
    assert!((plot.y_lim().lo() - 1.4).abs() < 1e-12);
    assert!((plot.y_lim().hi() - 8.6).abs() < 1e-12);
    Ok(())
}

#[test]
fn log_scale_leaves_out_non_positive_values() -> Result<()> {
    let mut plot = Plot::default();
    plot.set_points(
        MAIN_LAYER_ID,
        vec![
            Point::new(-5., 10.),
            Point::new(1., 100.),
            Point::new(10., 0.),
            Point::new(100., 1000.),
        ],
    );
    plot.set_log_scale(LogScale::XY);
    let (x_lim, y_lim) = (plot.x_lim(), plot.y_lim());
    assert!(x_lim.is_log_compatible() && y_lim.is_log_compatible());
    assert!(x_lim.lo() < 1. && x_lim.hi() > 100.);
    assert!(y_lim.lo() < 10. && y_lim.hi() > 1000.);
    let ticks = plot.x_axis().ticks();
    assert!(ticks.contains(&1.) && ticks.contains(&100.));

    // back to linear, the negative value counts again
    plot.set_log_scale(LogScale::None);
    assert!(plot.x_lim().lo() < -5.);
    Ok(())
}

#[test]
fn invalid_configuration_keeps_the_plot() -> Result<()> {
    // no room for the box: the default size is used instead
    let mut plot = Plot::new(kurbo::Point::ZERO, kurbo::Size::new(10., 10.));
    assert_eq!(plot.outer_dim(), kurbo::Size::new(450., 300.));

    plot.set_points(MAIN_LAYER_ID, vec![Point::new(2., 2.), Point::new(8., 8.)]);
    plot.set_x_lim((0., 10.));
    let before = (plot.x_lim(), plot.y_lim());
    plot.set_x_lim((3., 3.));
    plot.set_y_lim((2., 2.));
    plot.set_x_lim((f64::NAN, 1.));
    assert_eq!((plot.x_lim(), plot.y_lim()), before);
    assert!(plot.is_fixed_x_lim() && !plot.is_fixed_y_lim());
    assert_eq!(plot.main_layer().x_lim(), before.0);
    assert!(plot.main_layer().inside().iter().all(|&inside| inside));

    plot.set_outer_dim(kurbo::Size::new(-5., 300.));
    assert_eq!(plot.outer_dim(), kurbo::Size::new(450., 300.));

    // bulk setters with the wrong number of items
    let labels = plot.x_axis().tick_labels().to_vec();
    plot.x_axis_mut().set_tick_labels(vec!["too", "few"]);
    assert_eq!(plot.x_axis().tick_labels(), &labels[..]);
    assert!(!plot.x_axis().is_fixed_ticks());
    plot.set_point_colors(Vec::<Color>::new());
    plot.set_point_sizes(vec![5., -1.]);
    assert_eq!(plot.main_layer().point_colors().len(), 1);
    assert_eq!(plot.main_layer().point_sizes(), &[7.]);

    let mut rc = NullRenderContext::new();
    drawing(plot.default_draw(&mut rc))?;
    Ok(())
}

#[test]
fn screen_round_trip() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(11);
    let mut plot = Plot::new(kurbo::Point::new(25., 40.), kurbo::Size::new(600., 400.));
    plot.set_x_lim(Lim::new(-3., 12.));
    plot.set_y_lim(Lim::new(250., 0.5));
    let over_box = (Uniform::new(96., 594.), Uniform::new(81., 379.));
    for _ in 0..200 {
        let screen = kurbo::Point::new(over_box.0.sample(&mut rng), over_box.1.sample(&mut rng));
        assert!(plot.is_over_box(screen));
        let (x, y) = plot.value_at(screen);
        let back = plot.screen_pos_at_value(x, y);
        assert!((back - screen).hypot() < 1e-9);
    }
    Ok(())
}

#[test]
fn editing_points_from_the_screen() -> Result<()> {
    let mut plot = Plot::default();
    plot.set_x_lim(Lim::new(0., 10.));
    plot.set_y_lim(Lim::new(0., 10.));
    assert!(plot.add_layer_with_points("edits", Vec::<Point>::new()));

    let screen = kurbo::Point::new(200., 150.);
    plot.add_point_at("edits", screen);
    let layer = plot.layer("edits").ok_or_else(|| anyhow!("layer is gone"))?;
    assert_eq!(layer.len(), 1);
    let (x, y) = plot.value_at(screen);
    assert!(close(layer.points()[0].x(), x) && close(layer.points()[0].y(), y));

    // close enough to hit the marker
    let near = screen + kurbo::Vec2::new(2., -2.);
    assert!(plot.point_at("edits", near).is_some());
    assert!(plot.point_at(MAIN_LAYER_ID, near).is_none());
    assert!(plot.remove_point_at("edits", near).is_some());
    assert!(plot.layer("edits").map_or(false, |layer| layer.is_empty()));

    // unknown layers are ignored
    plot.add_point_at("missing", screen);
    assert!(plot.layer("missing").is_none());
    Ok(())
}

#[test]
fn interactive_session() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(3);
    let mut plot = Plot::default();
    plot.set_points(
        MAIN_LAYER_ID,
        random_points(&mut rng, 100, &Normal::new(0., 1.)?),
    );
    plot.activate_default_zooming();
    plot.activate_panning(Gesture::new(Button::Left, Modifier::None));
    plot.activate_reset(Gesture::new(Button::Right, Modifier::Control));
    let start = (plot.x_lim(), plot.y_lim());

    // zoom in twice around the middle of the box
    let middle = kurbo::Point::new(245., 140.);
    assert!(plot.on_click(middle, Button::Left, Modifier::None));
    assert!(plot.on_click(middle, Button::Left, Modifier::None));
    // the wheel is not one of the default gestures
    assert!(!plot.on_wheel(1., middle, Modifier::None));
    let zoomed = plot.x_lim().span();
    assert!(zoomed < start.0.span() / 1.5);

    // clicks outside the box are left to the host
    assert!(!plot.on_click(kurbo::Point::new(5., 5.), Button::Left, Modifier::None));

    // the value grabbed stays under the pointer
    let grab = kurbo::Point::new(150., 100.);
    let value = plot.value_at(grab);
    assert!(plot.on_pointer_down(grab, Button::Left, Modifier::None));
    for step in 1..=10 {
        let pos = grab + kurbo::Vec2::new(10. * step as f64, 5. * step as f64);
        assert!(plot.on_pointer_move(pos));
        let (x, y) = plot.value_at(pos);
        assert!(close(x, value.0) && close(y, value.1));
    }
    assert!(plot.on_pointer_up());
    assert!(!plot.on_pointer_move(grab));
    assert!(close(plot.x_lim().span(), zoomed));

    // back to where the session started
    assert!(plot.on_click(middle, Button::Right, Modifier::Control));
    assert_eq!((plot.x_lim(), plot.y_lim()), start);
    Ok(())
}

#[test]
fn draws_everything() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(5);
    let mut plot = Plot::default();
    plot.set_points(
        MAIN_LAYER_ID,
        random_points(&mut rng, 30, &Uniform::new(1., 50.)),
    );
    assert!(plot.add_layer_with_points(
        "second",
        random_points(&mut rng, 30, &Uniform::new(-10., 60.))
    ));
    plot.set_title_text("Random data");
    plot.x_axis_mut().label_mut().set_text("x");
    plot.y_axis_mut().label_mut().set_text("y");
    plot.start_histograms(HistogramType::Vertical);
    plot.set_draw_hist_labels(true);
    plot.activate_point_labels(Gesture::new(Button::Left, Modifier::Shift));
    assert!(plot.on_pointer_down(
        kurbo::Point::new(200., 150.),
        Button::Left,
        Modifier::Shift
    ));

    let mut rc = NullRenderContext::new();
    drawing(plot.default_draw(&mut rc))?;
    drawing(plot.begin_draw(&mut rc, |rc| {
        plot.draw_grid_lines(rc, GridLines::Both)?;
        plot.draw_top_axis(rc)?;
        plot.draw_right_axis(rc)?;
        plot.draw_histograms(rc)?;
        plot.draw_filled_contours(rc, ContourType::Horizontal, 0.)?;
        plot.draw_filled_contours(rc, ContourType::Vertical, 25.)?;
        plot.draw_line_slope(rc, 1., 0.)?;
        plot.draw_horizontal_line(rc, 25.)?;
        plot.draw_vertical_line(rc, 25.)?;
        plot.draw_polygon(
            rc,
            &[
                Point::new(-100., 10.),
                Point::new(25., 200.),
                Point::new(40., 20.),
            ],
            Color::rgba8(0, 0, 255, 80),
        )?;
        plot.draw_annotation(rc, "middle", 25., 25., HAlign::Center, VAlign::Center)?;
        plot.draw_labels(rc)?;
        plot.draw_legend(rc, &["main", "second"], &[0.1, 0.1], &[0.9, 0.8])
    }))?;

    // the same plot on log scales
    plot.set_log_scale_str("xy");
    assert!(plot.x_log() && plot.y_log());
    drawing(plot.default_draw(&mut rc))?;
    drawing(plot.begin_draw(&mut rc, |rc| plot.draw_histograms(rc)))?;
    Ok(())
}
