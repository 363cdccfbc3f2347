mod support;

use support::mock_buffer::MockBuffer;
use value_dial::{
    Command, Config, DialectKind, EditSession, Engine, Feedback, InputEvent, Modifiers,
    NumberOptions, Position, Range, Target, apply_commands,
};

fn number() -> Target {
    Target::Number(NumberOptions::default())
}

fn cross() -> Target {
    Target::Number(NumberOptions {
        cross: true,
        selection: false,
    })
}

fn selection() -> Target {
    Target::Number(NumberOptions {
        cross: false,
        selection: true,
    })
}

fn turn(
    engine: &Engine,
    session: &mut EditSession,
    buffer: &mut MockBuffer,
    target: Target,
    notches: i32,
    modifiers: Modifiers,
) -> Vec<Command> {
    let event = InputEvent::new(target, notches, f64::from(notches)).with_modifiers(modifiers);
    let commands = engine.handle_event(&*buffer, session, &event);
    apply_commands(buffer, &commands);
    commands
}

fn range(line: u32, start: u32, end: u32) -> Range {
    Range::new(Position::new(line, start), Position::new(line, end))
}

#[test]
fn test_number_keeps_its_unit() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("width: 12px;").with_carets(&[(0, 8)]);

    turn(&engine, &mut session, &mut buffer, number(), 1, Modifiers::empty());

    assert_eq!(buffer.line_str(0), "width: 13px;");
    assert_eq!(buffer.current_selections(), &[range(0, 7, 11)]);
    assert_eq!(buffer.last_feedback(), Some(&Feedback::new("", "±1")));

    turn(&engine, &mut session, &mut buffer, number(), 1, Modifiers::SHIFT);
    assert_eq!(buffer.line_str(0), "width: 113px;");
}

#[test]
fn test_cross_moves_negatives_away_from_zero() {
    let engine = Engine::new();

    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("margin: -5px;").with_carets(&[(0, 9)]);
    turn(&engine, &mut session, &mut buffer, cross(), 1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "margin: -6px;");

    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("margin: -5px;").with_carets(&[(0, 9)]);
    turn(&engine, &mut session, &mut buffer, number(), 1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "margin: -4px;");
}

#[test]
fn test_cross_direction_is_fixed_at_first_touch() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("left: -1px;").with_carets(&[(0, 7)]);

    turn(&engine, &mut session, &mut buffer, cross(), -1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "left: 0px;");

    turn(&engine, &mut session, &mut buffer, cross(), -1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "left: 1px;");
}

#[test]
fn test_spans_on_one_line_shift_together() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("a: 9px; b: 5px;").with_carets(&[(0, 3), (0, 11)]);

    turn(&engine, &mut session, &mut buffer, number(), 1, Modifiers::empty());

    assert_eq!(buffer.line_str(0), "a: 10px; b: 6px;");
    assert_eq!(
        buffer.current_selections(),
        &[range(0, 3, 7), range(0, 12, 15)]
    );

    turn(&engine, &mut session, &mut buffer, number(), -1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "a: 9px; b: 5px;");
}

#[test]
fn test_duplicate_carets_edit_once() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("top: 4px;").with_carets(&[(0, 5), (0, 6)]);

    turn(&engine, &mut session, &mut buffer, number(), 1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "top: 5px;");
}

#[test]
fn test_different_steps_show_placeholder() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer =
        MockBuffer::new("transition: 300ms; width: 10px;").with_carets(&[(0, 13), (0, 27)]);

    turn(&engine, &mut session, &mut buffer, number(), 1, Modifiers::empty());

    assert_eq!(buffer.line_str(0), "transition: 310ms; width: 11px;");
    assert_eq!(buffer.last_feedback(), Some(&Feedback::new("", "±?")));
}

#[test]
fn test_numbers_inside_colors_follow_channel_rules() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("color: rgba(10, 20, 30, 0.5);").with_carets(&[(0, 25)]);

    turn(&engine, &mut session, &mut buffer, number(), 1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "color: rgba(10, 20, 30, 0.6);");
    assert_eq!(buffer.last_feedback(), Some(&Feedback::new("", "±0.1")));

    let mut session = EditSession::new();
    buffer.select(&[Range::caret(Position::new(0, 13))]);
    for _ in 0..3 {
        turn(&engine, &mut session, &mut buffer, number(), 1, Modifiers::SHIFT);
    }
    assert_eq!(buffer.line_str(0), "color: rgba(255, 20, 30, 0.6);");
}

#[test]
fn test_unit_scaling_follows_config() {
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("margin: 1.5rem;").with_carets(&[(0, 9)]);
    turn(&Engine::new(), &mut session, &mut buffer, number(), 1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "margin: 1.6rem;");

    let config = Config {
        units_step: false,
        ..Config::default()
    };
    let engine = Engine::builder().config(config).build();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("margin: 1.5rem;").with_carets(&[(0, 9)]);
    turn(&engine, &mut session, &mut buffer, number(), 1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "margin: 2.5rem;");
}

#[test]
fn test_small_steps_do_not_drift() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("opacity: 0.1;").with_carets(&[(0, 10)]);

    for _ in 0..10 {
        turn(
            &engine,
            &mut session,
            &mut buffer,
            number(),
            1,
            Modifiers::CTRL | Modifiers::ALT,
        );
    }
    assert_eq!(buffer.line_str(0), "opacity: 0.2;");
}

#[test]
fn test_selection_mode_edits_selected_text() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("x: 12.5 y").with_selections(&[range(0, 3, 7)]);

    turn(&engine, &mut session, &mut buffer, selection(), 1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "x: 13.5 y");
    assert_eq!(buffer.current_selections(), &[range(0, 3, 7)]);

    let mut session = EditSession::new();
    let mut buffer =
        MockBuffer::new("width: 12px; height: 3px;").with_selections(&[range(0, 7, 12)]);
    turn(&engine, &mut session, &mut buffer, selection(), 1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "width: 13px; height: 3px;");
}

#[test]
fn test_selection_mode_skips_text_without_numbers() {
    let engine = Engine::new();

    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("no digits here").with_selections(&[range(0, 0, 2)]);
    let commands = turn(&engine, &mut session, &mut buffer, selection(), 1, Modifiers::empty());
    assert!(commands.is_empty());

    let mut session = EditSession::new();
    let mut buffer = MockBuffer::new("abc 5").with_selections(&[range(0, 0, 3)]);
    turn(&engine, &mut session, &mut buffer, selection(), 1, Modifiers::empty());
    assert_eq!(buffer.line_str(0), "abc 5");
    assert!(buffer.transactions.is_empty());
}

#[test]
fn test_refresh_reports_change_nothing() {
    let engine = Engine::new();
    let mut session = EditSession::new();
    let buffer = MockBuffer::new("width: 12px;").with_carets(&[(0, 8)]);

    for event in [
        InputEvent::new(number(), 0, 0.0),
        InputEvent::new(number(), 1, 0.0),
        InputEvent::new(number(), 0, 0.4),
    ] {
        assert!(engine.handle_event(&buffer, &mut session, &event).is_empty());
    }
    assert!(!session.has_state());
}

#[test]
fn test_number_precedence_inside_colors() {
    let buffer = MockBuffer::new("color: rgba(10, 20, 30, 0.5);").with_carets(&[(0, 13)]);
    assert_eq!(Engine::new().probe(&buffer), Some(DialectKind::Number));

    let config = Config {
        numbers_over_colors: false,
        ..Config::default()
    };
    let engine = Engine::builder().config(config).build();
    assert_eq!(engine.probe(&buffer), Some(DialectKind::Color));

    let hex = MockBuffer::new("color: #123;").with_carets(&[(0, 9)]);
    assert_eq!(Engine::new().probe(&hex), Some(DialectKind::Color));
}
