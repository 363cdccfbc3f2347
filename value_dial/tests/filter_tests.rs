mod support;

use support::mock_buffer::MockBuffer;
use value_dial::dialect::{FilterChain, FilterFunction};
use value_dial::{
    Config, DialectKind, Direction, EditSession, Engine, Feedback, InputEvent, Modifiers,
    Position, Range, Target, apply_commands,
};

fn turn(
    engine: &Engine,
    session: &mut EditSession,
    buffer: &mut MockBuffer,
    function: FilterFunction,
    notches: i32,
    modifiers: Modifiers,
) {
    let event = InputEvent::new(Target::Filter(function), notches, f64::from(notches))
        .with_modifiers(modifiers);
    let commands = engine.handle_event(&*buffer, session, &event);
    apply_commands(buffer, &commands);
}

#[test]
fn test_identity_calls_are_dropped() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer =
        MockBuffer::new("  filter: brightness(100%) blur(0px);").with_carets(&[(0, 4)]);

    turn(
        &engine,
        &mut session,
        &mut buffer,
        FilterFunction::Brightness,
        1,
        Modifiers::SHIFT,
    );

    assert_eq!(buffer.line_str(0), "  filter: brightness(120%);");
    assert_eq!(
        buffer.current_selections(),
        &[Range::new(Position::new(0, 10), Position::new(0, 26))]
    );
    assert_eq!(
        buffer.last_feedback(),
        Some(&Feedback::new("BrightnessCSSFilter", "120"))
    );
}

#[test]
fn test_none_gains_the_turned_function() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("filter: none;").with_carets(&[(0, 0)]);

    turn(
        &engine,
        &mut session,
        &mut buffer,
        FilterFunction::Brightness,
        1,
        Modifiers::empty(),
    );
    assert_eq!(buffer.line_str(0), "filter: brightness(105%);");
}

#[test]
fn test_chain_back_at_identity_renders_none() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("filter: blur(1px);").with_carets(&[(0, 2)]);

    turn(
        &engine,
        &mut session,
        &mut buffer,
        FilterFunction::Blur,
        -1,
        Modifiers::empty(),
    );

    assert_eq!(buffer.line_str(0), "filter: none;");
    assert_eq!(
        buffer.current_selections(),
        &[Range::caret(Position::new(0, 8))]
    );
    assert_eq!(buffer.last_feedback(), Some(&Feedback::new("BlurCSSFilter", "0")));
}

#[test]
fn test_missing_function_is_appended() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("filter: blur(2px);").with_carets(&[(0, 2)]);

    turn(
        &engine,
        &mut session,
        &mut buffer,
        FilterFunction::HueRotate,
        -1,
        Modifiers::empty(),
    );

    assert_eq!(buffer.line_str(0), "filter: blur(2px) hue-rotate(-5deg);");
    assert_eq!(
        buffer.current_selections(),
        &[Range::new(Position::new(0, 18), Position::new(0, 35))]
    );
}

#[test]
fn test_unitless_arguments_step_as_fractions() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("filter: brightness(1);").with_carets(&[(0, 2)]);

    turn(
        &engine,
        &mut session,
        &mut buffer,
        FilterFunction::Brightness,
        1,
        Modifiers::empty(),
    );
    assert_eq!(buffer.line_str(0), "filter: brightness(1.05);");
}

#[test]
fn test_vendor_prefix_is_kept() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("-webkit-filter: blur(2px);").with_carets(&[(0, 0)]);

    turn(
        &engine,
        &mut session,
        &mut buffer,
        FilterFunction::Blur,
        1,
        Modifiers::empty(),
    );
    assert_eq!(buffer.line_str(0), "-webkit-filter: blur(3px);");
}

#[test]
fn test_unknown_calls_survive_an_edit() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer =
        MockBuffer::new("filter: drop-shadow(0 0 2px red) blur(1px);").with_carets(&[(0, 2)]);

    turn(
        &engine,
        &mut session,
        &mut buffer,
        FilterFunction::Blur,
        1,
        Modifiers::empty(),
    );
    assert_eq!(
        buffer.line_str(0),
        "filter: drop-shadow(0 0 2px red) blur(2px);"
    );
}

#[test]
fn test_clamped_turn_leaves_text_alone() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("filter: opacity(100%);").with_carets(&[(0, 2)]);

    turn(
        &engine,
        &mut session,
        &mut buffer,
        FilterFunction::Opacity,
        1,
        Modifiers::empty(),
    );

    assert_eq!(buffer.line_str(0), "filter: opacity(100%);");
    assert!(buffer.transactions.is_empty());
    assert_eq!(
        buffer.last_feedback(),
        Some(&Feedback::new("OpacityCSSFilter", "100"))
    );
}

#[test]
fn test_feedback_compares_units() {
    let engine = Engine::new();

    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("filter: brightness(1.2);\nfilter: brightness(120%);")
        .with_carets(&[(0, 2), (1, 2)]);
    turn(
        &engine,
        &mut session,
        &mut buffer,
        FilterFunction::Brightness,
        1,
        Modifiers::empty(),
    );
    assert_eq!(
        buffer.text(),
        "filter: brightness(1.25);\nfilter: brightness(125%);"
    );
    assert_eq!(
        buffer.last_feedback(),
        Some(&Feedback::new("BrightnessCSSFilter", "1.25"))
    );

    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("filter: brightness(100%);\nfilter: brightness(150%);")
        .with_carets(&[(0, 2), (1, 2)]);
    turn(
        &engine,
        &mut session,
        &mut buffer,
        FilterFunction::Brightness,
        1,
        Modifiers::empty(),
    );
    assert_eq!(
        buffer.last_feedback(),
        Some(&Feedback::unresolved("BrightnessCSSFilter"))
    );
}

#[test]
fn test_number_under_caret_wins_by_default() {
    let buffer = MockBuffer::new("filter: blur(2px);").with_carets(&[(0, 14)]);
    assert_eq!(Engine::new().probe(&buffer), Some(DialectKind::Number));

    let config = Config {
        numbers_over_filters: false,
        ..Config::default()
    };
    let engine = Engine::builder().config(config).build();
    assert_eq!(engine.probe(&buffer), Some(DialectKind::FilterChain));

    let keyword = MockBuffer::new("filter: blur(2px);").with_carets(&[(0, 3)]);
    assert_eq!(Engine::new().probe(&keyword), Some(DialectKind::FilterChain));
}

#[test]
fn test_chain_steps_by_unit() {
    let mut chain = FilterChain::parse("filter: blur(1rem) hue-rotate(10deg)");
    chain.apply(FilterFunction::Blur, Direction::Increase, Modifiers::empty());
    chain.apply(FilterFunction::HueRotate, Direction::Increase, Modifiers::CTRL);
    assert_eq!(
        chain.render().text,
        "filter: blur(1.1rem) hue-rotate(20deg)"
    );
}

#[test]
fn test_opacity_stays_in_range() {
    let mut chain = FilterChain::parse("filter: opacity(0.02)");
    chain.apply(FilterFunction::Opacity, Direction::Decrease, Modifiers::empty());
    assert_eq!(chain.render().text, "filter: opacity(0)");
}
