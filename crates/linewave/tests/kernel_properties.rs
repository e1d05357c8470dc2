use linewave::kernel::{self, bend_offset, line_color};
use linewave::{
    Band, FrameInputs, LineSetting, PixelBuffer, RenderConfig, ResolvedParams, POINTER_SENTINEL,
};

const WIDTH: u32 = 48;
const HEIGHT: u32 = 27;

fn frame(params: ResolvedParams) -> FrameInputs {
    FrameInputs {
        params,
        time: 2.0,
        resolution: [WIDTH as f32, HEIGHT as f32],
        pointer: POINTER_SENTINEL,
        bend_influence: 0.0,
        parallax_offset: [0.0, 0.0],
    }
}

fn render(inputs: &FrameInputs) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(WIDTH, HEIGHT);
    kernel::render(inputs, &mut buffer);
    buffer
}

fn config_with_bands(bands: &[Band]) -> RenderConfig {
    RenderConfig {
        enabled_waves: bands.to_vec(),
        ..RenderConfig::default()
    }
}

#[test]
fn identical_inputs_render_identical_pixels() {
    let mut inputs = frame(RenderConfig::default().resolve());
    inputs.pointer = [20.0, 10.0];
    inputs.bend_influence = 0.6;
    inputs.parallax_offset = [0.03, 0.015];
    assert_eq!(render(&inputs), render(&inputs));
}

#[test]
fn single_stop_colors_every_line_identically() {
    let params = RenderConfig {
        lines_gradient: Some(vec!["#3366cc".into()]),
        ..RenderConfig::default()
    }
    .resolve();
    let expected = linewave::parse_hex("#3366cc");
    for count in [1, 2, 15, 30] {
        for index in 0..count {
            assert_eq!(line_color(&params, index, count), expected);
        }
    }
}

#[test]
fn empty_gradient_renders_black_lines() {
    let params = RenderConfig {
        lines_gradient: Some(Vec::new()),
        ..RenderConfig::default()
    }
    .resolve();
    assert_eq!(line_color(&params, 3, 10), [0.0; 3]);
    let buffer = render(&frame(params));
    assert!(buffer.pixels().iter().all(|p| *p == [0.0; 3]));
}

#[test]
fn two_stops_span_first_to_last_line() {
    let params = RenderConfig {
        lines_gradient: Some(vec!["#ff0000".into(), "#0000ff".into()]),
        ..RenderConfig::default()
    }
    .resolve();
    let first = line_color(&params, 0, 12);
    let last = line_color(&params, 11, 12);
    assert_eq!(first, [1.0, 0.0, 0.0]);
    assert!((last[0]).abs() < 1e-6 && (last[2] - 1.0).abs() < 1e-6);
}

#[test]
fn disabled_bands_contribute_nothing() {
    let middle_only = config_with_bands(&[Band::Middle]).resolve();
    let inputs = frame(middle_only);
    let uv = inputs.base_uv([10.5, 8.5]);
    let pointer = inputs.pointer_uv();
    assert_eq!(
        kernel::band_contribution(&inputs, Band::Top, uv, pointer),
        [0.0; 3]
    );
    assert_eq!(
        kernel::band_contribution(&inputs, Band::Bottom, uv, pointer),
        [0.0; 3]
    );

    let all = frame(RenderConfig::default().resolve());
    let middle_alone = render(&inputs);
    let expected: Vec<[f32; 3]> = (0..HEIGHT)
        .flat_map(|row| (0..WIDTH).map(move |col| (row, col)))
        .map(|(row, col)| {
            let frag = [col as f32 + 0.5, HEIGHT as f32 - (row as f32 + 0.5)];
            let uv = all.base_uv(frag);
            kernel::band_contribution(&all, Band::Middle, uv, all.pointer_uv())
        })
        .collect();
    assert_eq!(middle_alone.pixels(), expected.as_slice());
}

#[test]
fn bend_falls_off_to_zero_at_radius() {
    let params = RenderConfig::default().resolve();
    let influence = 0.8;
    let full = bend_offset(&params, influence, 0.0);
    assert!((full - params.bend_strength * influence).abs() < 1e-6);
    assert_eq!(bend_offset(&params, influence, params.bend_radius), 0.0);
    assert_eq!(bend_offset(&params, influence, params.bend_radius * 3.0), 0.0);

    let passive = RenderConfig {
        interactive: false,
        ..RenderConfig::default()
    }
    .resolve();
    assert_eq!(bend_offset(&passive, influence, 0.0), 0.0);
}

#[test]
fn pointer_only_changes_pixels_when_interactive() {
    let mut inputs = frame(RenderConfig::default().resolve());
    let rest = render(&inputs);
    inputs.pointer = [24.0, 13.0];
    inputs.bend_influence = 1.0;
    assert_ne!(render(&inputs), rest);

    let mut passive = frame(
        RenderConfig {
            interactive: false,
            ..RenderConfig::default()
        }
        .resolve(),
    );
    let passive_rest = render(&passive);
    passive.pointer = [24.0, 13.0];
    passive.bend_influence = 1.0;
    assert_eq!(render(&passive), passive_rest);
}

#[test]
fn zero_line_counts_render_black_without_nan() {
    let params = RenderConfig {
        line_count: LineSetting::PerBand(vec![0, 0, 0]),
        ..RenderConfig::default()
    }
    .resolve();
    assert_eq!(params.visible_lines(), 0);
    let buffer = render(&frame(params));
    for pixel in buffer.pixels() {
        assert!(pixel.iter().all(|c| c.is_finite()));
        assert_eq!(*pixel, [0.0; 3]);
    }
}

#[test]
fn degenerate_surface_stays_finite() {
    let mut inputs = frame(RenderConfig::default().resolve());
    inputs.resolution = [1.0, 1.0];
    let mut buffer = PixelBuffer::new(1, 1);
    kernel::render(&inputs, &mut buffer);
    assert!(buffer.pixels()[0].iter().all(|c| c.is_finite()));
}
