use proptest::prelude::*;
use rust_decimal::Decimal;
use value_dial::dialect::ColorValue;
use value_dial::dialect::FilterFunction;
use value_dial::dialect::scalar::{ScalarPolicy, ScalarValue};
use value_dial::numeric::{Clamp, format_decimal};
use value_dial::types::text_width;
use value_dial::{
    ColorChannel, Direction, EditSession, Engine, InputEvent, Modifiers, NumberOptions, Target,
    TextSource, apply_commands,
};

mod support;
use support::mock_buffer::MockBuffer;

// Strategy for generating lines with and without value literals
fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Arbitrary CSS-ish noise
        "[a-z#(),:;%. 0-9\\-]{0,40}",
        // Hex colors
        "  color: #[0-9a-fA-F]{3,8};",
        // Functional colors, some malformed
        "background: (rgb|rgba|hsl|hsla)\\([0-9]{1,3}%?, ?[0-9]{1,3}%?, ?[0-9]{1,3}%?(, ?0?\\.[0-9]{1,2})?\\);",
        // Filter chains
        "filter: ((none)|((blur|brightness|contrast|saturate|opacity|hue-rotate|sepia)\\(-?[0-9]{0,3}\\.?[0-9]{1,2}(px|%|deg|rem)?\\) ?){1,3});",
        // Numbers with units, several lines
        "(margin: -?[0-9]{1,3}(\\.[0-9])?(px|em|rem|ms|s|%)?;\n){1,3}",
        // Named colors
        "border: 1px solid (red|tomato|rebeccapurple|transparent|navy);",
    ]
}

fn target_strategy() -> impl Strategy<Value = Target> {
    prop_oneof![
        Just(Target::Color(ColorChannel::Hue)),
        Just(Target::Color(ColorChannel::Saturation)),
        Just(Target::Color(ColorChannel::Lightness)),
        Just(Target::Color(ColorChannel::Alpha)),
        Just(Target::Color(ColorChannel::Predefined)),
        prop::sample::select(FilterFunction::ALL.to_vec()).prop_map(Target::Filter),
        (any::<bool>(), any::<bool>())
            .prop_map(|(cross, selection)| Target::Number(NumberOptions { cross, selection })),
    ]
}

fn caret_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((0u32..4, 0u32..60), 1..4)
}

proptest! {
    #[test]
    fn turn_never_panics_and_keeps_selections_in_bounds(
        text in text_strategy(),
        carets in caret_strategy(),
        target in target_strategy(),
        notches in prop_oneof![-3i32..0, 1i32..4],
        mods in 0u8..8,
    ) {
        let engine = Engine::builder()
            .config(value_dial::Config {
                predefined_colors: vec!["red".into(), "#0f08".into()],
                ..Default::default()
            })
            .build();
        let mut session = EditSession::new();
        let lines: Vec<&str> = text.split('\n').collect();
        let carets: Vec<(u32, u32)> = carets
            .into_iter()
            .map(|(line, col)| {
                let line = line % lines.len() as u32;
                (line, col % (text_width(lines[line as usize]) + 1))
            })
            .collect();
        let mut buffer = MockBuffer::new(&text).with_carets(&carets);
        let event = InputEvent::new(target, notches, f64::from(notches))
            .with_modifiers(Modifiers::from_bits_truncate(mods));

        for _ in 0..3 {
            let commands = engine.handle_event(&buffer, &mut session, &event);
            apply_commands(&mut buffer, &commands);
        }

        for selection in buffer.selections() {
            let line = buffer.line(selection.end.line);
            prop_assert!(line.is_some());
            prop_assert!(selection.end.col <= text_width(&line.unwrap_or_default()));
        }
    }

    #[test]
    fn wrap_stays_in_period(value in -10_000_000i64..10_000_000, scale in 0u32..4) {
        let wrapped = Clamp::wrap(360).apply(Decimal::new(value, scale));
        prop_assert!(wrapped >= Decimal::ZERO);
        prop_assert!(wrapped < Decimal::from(360));
    }

    #[test]
    fn clamps_are_idempotent(value in -100_000i64..100_000, scale in 0u32..4) {
        let value = Decimal::new(value, scale);
        for clamp in [Clamp::wrap(360), Clamp::unit(), Clamp::range(0, 255), Clamp::NonNegative] {
            let once = clamp.apply(value);
            prop_assert_eq!(clamp.apply(once), once);
        }
    }

    #[test]
    fn hex_decodes_to_its_bytes(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let color = ColorValue::decode(&format!("#{r:02x}{g:02x}{b:02x}"));
        prop_assert!(color.is_some());
        prop_assert_eq!(color.map(|c| c.to_rgb()), Some([r, g, b]));
    }

    #[test]
    fn hue_there_and_back_restores_hsl(h in 0u32..360, s in 1u32..=100, l in 1u32..100) {
        let text = format!("hsl({h}, {s}%, {l}%)");
        let color = ColorValue::decode(&text);
        prop_assert!(color.is_some());
        let mut color = color.unwrap();

        color.apply(ColorChannel::Hue, Direction::Increase, Decimal::from(5));
        color.apply(ColorChannel::Hue, Direction::Decrease, Decimal::from(5));
        prop_assert_eq!(color.render(), text);
    }

    #[test]
    fn number_there_and_back_restores_text(
        n in -100_000i64..100_000,
        unit in prop::sample::select(vec!["", "px", "em", "%", "deg"]),
        mods in 0u8..8,
    ) {
        let text = format!("{n}{unit}");
        let modifiers = Modifiers::from_bits_truncate(mods);
        let mut value = ScalarValue::parse(&text, ScalarPolicy::default());

        value.apply(Direction::Increase, modifiers, false);
        value.apply(Direction::Decrease, modifiers, false);
        prop_assert_eq!(value.render(), text);
    }

    #[test]
    fn small_steps_accumulate_exactly(count in 1i64..300) {
        let mut value = ScalarValue::parse("0", ScalarPolicy::default());
        let finest = Modifiers::SHIFT | Modifiers::CTRL | Modifiers::ALT;
        for _ in 0..count {
            value.apply(Direction::Increase, finest, false);
        }
        prop_assert_eq!(value.render(), format_decimal(Decimal::new(count, 4)));
    }
}
