use std::time::Instant;

use crate::config::{Config, Palette};
use crate::coordinator::Batch;
use crate::dialect::scalar::{self, ScalarPolicy};
use crate::dialect::{
    ColorValue, Context, DialectKind, Mutation, Reading, Registry, Rendered, RuleId, ValueKind,
};
use crate::key::{Direction, InputEvent, Modifiers};
use crate::locate::{Found, Locator};
use crate::numeric::format_decimal;
use crate::session::EditSession;
use crate::tool::{COLOR_TOOL, COLOR_WITH_PREDEFINED_TOOL, ColorChannel, FILTERS_TOOL, Target};
use crate::traits::TextSource;
use crate::types::{Command, Feedback, Range, Span};

/// One selection's located literal.
#[derive(Debug, Clone)]
struct Hit {
    rule: RuleId,
    found: Found,
    span: Span,
    line: String,
    caret: u32,
}

fn kind_for(target: &Target) -> DialectKind {
    match target {
        Target::Color(_) => DialectKind::Color,
        Target::Filter(_) => DialectKind::FilterChain,
        Target::Number(_) => DialectKind::Number,
    }
}

fn plus_minus(step: &str) -> String {
    format!("\u{00B1}{step}")
}

#[derive(Debug)]
pub struct Engine {
    config: Config,
    registry: Registry,
    palette: Vec<(String, ColorValue)>,
}

pub struct EngineBuilder {
    config: Config,
    registry: Option<Registry>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            registry: None,
        }
    }
}

impl EngineBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Engine {
        let palette = Palette::decode(&self.config.predefined_colors);
        Engine {
            config: self.config,
            registry: self.registry.unwrap_or_default(),
            palette,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::default().build()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn palette(&self) -> &[(String, ColorValue)] {
        &self.palette
    }

    pub fn locator(&self) -> Locator<'_> {
        Locator::new(&self.registry, self.config.precedence())
    }

    /// Device tool id for a dialect family.
    pub fn tool_id(&self, kind: DialectKind) -> &'static str {
        match kind {
            DialectKind::Color if self.palette.is_empty() => COLOR_TOOL,
            DialectKind::Color => COLOR_WITH_PREDEFINED_TOOL,
            DialectKind::FilterChain => FILTERS_TOOL,
            DialectKind::Number => self.config.number_tool_id(),
        }
    }

    /// The dialect under the first selection that sits on anything
    /// recognisable, honouring the configured precedence.
    pub fn probe<T: TextSource + ?Sized>(&self, text: &T) -> Option<DialectKind> {
        let locator = self.locator();
        text.selections().into_iter().find_map(|selection| {
            let selection = selection.ordered();
            let line = text.line(selection.start.line)?;
            locator
                .classify(&line, selection.start.col)
                .map(|located| located.kind)
        })
    }

    /// Applies one turn to every selection and returns the commands for
    /// the host. Refresh-only reports and turns that touch nothing produce
    /// no commands.
    pub fn handle_event<T: TextSource + ?Sized>(
        &self,
        text: &T,
        session: &mut EditSession,
        event: &InputEvent,
    ) -> Vec<Command> {
        session.set_target(event.target);
        session.set_modifiers(event.modifiers);
        let Some(direction) = event.direction() else {
            return Vec::new();
        };
        session.feedback_timer.cancel();

        let hits = self.collect(text, &event.target);
        if hits.is_empty() {
            return Vec::new();
        }

        let spans: Vec<Span> = hits.iter().map(|hit| hit.span.clone()).collect();
        session.sync(&spans);

        let predefined = event.target == Target::Color(ColorChannel::Predefined);
        let swatch = if predefined {
            match self.next_swatch(session, &hits[0].span.text, direction) {
                Some(index) => Some(&self.palette[index]),
                None => return Vec::new(),
            }
        } else {
            None
        };

        let mutation = Mutation {
            direction,
            modifiers: event.modifiers,
            target: &event.target,
        };
        let mut batch = Batch::new();
        let mut readings = Vec::new();

        for (index, hit) in hits.into_iter().enumerate() {
            let Some(rule) = self.registry.get(hit.rule) else {
                continue;
            };
            let context = Context {
                line: &hit.line,
                caret: hit.caret,
                config: &self.config,
            };
            let slot = session.slot_or_insert_with(index, rule.kind(), || {
                rule.decompose(&hit.found, &context)
            });

            let rendered = if let Some((swatch_text, color)) = swatch {
                slot.value = Some(ValueKind::Color(color.clone()));
                Rendered::plain(swatch_text.clone())
            } else if let Some(value) = slot.value.as_mut() {
                value.begin_cycle();
                rule.mutate(value, &mutation);
                readings.extend(rule.read(value, &mutation));
                rule.serialize(value)
            } else {
                Rendered::plain(hit.span.text.clone())
            };
            batch.push(hit.span, rendered);
        }

        let transaction = session.next_transaction();
        let mut commands = batch.commands(transaction);
        session.store_fingerprint(batch.fingerprint());
        tracing::trace!(
            spans = batch.results().len(),
            commands = commands.len(),
            ?transaction,
            "turn applied"
        );

        let feedback = if predefined {
            Some(Feedback::new(ColorChannel::Predefined.display_name(), ""))
        } else {
            aggregate(&event.target, &readings)
        };
        commands.extend(feedback.map(Command::UpdateFeedback));
        commands
    }

    /// Touch began (`true`) or ended. Touching arms the feedback refresh and
    /// keeps decoded values alive; letting go starts the countdown to
    /// forgetting them.
    pub fn touch(&self, session: &mut EditSession, touched: bool, now: Instant) {
        session.feedback_timer.cancel();
        if touched {
            session.forget_timer.cancel();
            session
                .feedback_timer
                .schedule(now, self.config.feedback_delay());
        } else {
            session.forget_timer.schedule(now, self.config.forget_delay());
        }
    }

    /// Fires whichever timers are due.
    pub fn poll<T: TextSource + ?Sized>(
        &self,
        text: &T,
        session: &mut EditSession,
        now: Instant,
    ) -> Vec<Command> {
        let mut commands = Vec::new();
        if session.feedback_timer.fire(now) {
            commands.push(Command::UpdateFeedback(self.idle_feedback(text, session)));
        }
        if session.forget_timer.fire(now) {
            session.forget();
        }
        commands
    }

    /// Held modifiers changed; the number tool shows the new step at once.
    pub fn modifiers_changed<T: TextSource + ?Sized>(
        &self,
        text: &T,
        session: &mut EditSession,
        modifiers: Modifiers,
    ) -> Vec<Command> {
        session.set_modifiers(modifiers);
        session.feedback_timer.cancel();
        match session.target() {
            Some(Target::Number(_)) => {
                vec![Command::UpdateFeedback(self.idle_feedback(text, session))]
            }
            _ => Vec::new(),
        }
    }

    /// Touch released for good, or the tool changed.
    pub fn end_interaction(&self, session: &mut EditSession) {
        tracing::debug!("interaction ended");
        session.end();
    }

    /// What the overlay shows between turns: the step the number tool
    /// would take, blank for everything else.
    pub fn idle_feedback<T: TextSource + ?Sized>(
        &self,
        text: &T,
        session: &EditSession,
    ) -> Feedback {
        let Some(target @ Target::Number(_)) = session.target() else {
            return Feedback::blank();
        };
        let modifiers = session.modifiers();
        let steps: Vec<String> = self
            .collect(text, &target)
            .iter()
            .map(|hit| {
                let policy = ScalarPolicy::at(&hit.line, hit.caret, &self.config);
                format_decimal(policy.step(modifiers))
            })
            .collect();

        match steps.split_first() {
            None => {
                let step = format_decimal(ScalarPolicy::default().step(modifiers));
                Feedback::new("", plus_minus(&step))
            }
            Some((first, rest)) if rest.iter().all(|step| step == first) => {
                Feedback::new("", plus_minus(first))
            }
            Some(_) => Feedback::new("", plus_minus("?")),
        }
    }

    /// Locates the literal under every selection, deduplicated and in
    /// document order.
    fn collect<T: TextSource + ?Sized>(&self, text: &T, target: &Target) -> Vec<Hit> {
        let locator = self.locator();
        let kind = kind_for(target);
        let selection_mode = matches!(target, Target::Number(options) if options.selection);

        let mut hits: Vec<Hit> = text
            .selections()
            .into_iter()
            .filter_map(|selection| {
                let selection = selection.ordered();
                let line = text.line(selection.start.line)?;
                let caret = selection.start.col;
                let (rule, found) = if selection_mode {
                    let found = selected_number(&line, selection)?;
                    (self.registry.first_of(DialectKind::Number)?, found)
                } else {
                    let located = locator.locate(&line, caret, kind)?;
                    (located.rule, located.found)
                };
                let span = Span {
                    line: selection.start.line,
                    start: found.start,
                    end: found.end,
                    text: found.text.clone(),
                };
                Some(Hit {
                    rule,
                    found,
                    span,
                    line,
                    caret,
                })
            })
            .collect();

        hits.sort_by_key(|hit| (hit.span.line, hit.span.start));
        hits.dedup_by(|later, earlier| later.span == earlier.span);
        for hit in &hits {
            tracing::trace!(line = hit.span.line, start = hit.span.start, text = %hit.span.text, "located");
        }
        hits
    }

    /// Palette entry for this turn. Continues from the last one while the
    /// selection is unchanged, otherwise from the entry matching `current`,
    /// otherwise from either end.
    fn next_swatch(
        &self,
        session: &mut EditSession,
        current: &str,
        direction: Direction,
    ) -> Option<usize> {
        let len = self.palette.len();
        if len == 0 {
            return None;
        }
        let start = session.palette_index().or_else(|| {
            let decoded = ColorValue::decode(current);
            self.palette.iter().position(|(text, color)| {
                text == current || decoded.as_ref().is_some_and(|c| c.same_color(color))
            })
        });
        let next = match (start, direction) {
            (Some(index), _) => (index as i64 + direction.signum()).rem_euclid(len as i64) as usize,
            (None, Direction::Increase) => 0,
            (None, Direction::Decrease) => len - 1,
        };
        session.set_palette_index(next);
        Some(next)
    }
}

/// The selected text itself as a number literal, for the selection mode of
/// the number tool. Empty or multi-line selections, and lines without any
/// number, are skipped.
fn selected_number(line: &str, selection: Range) -> Option<Found> {
    if selection.is_empty() || selection.start.line != selection.end.line {
        return None;
    }
    if !scalar::has_number(line) {
        return None;
    }
    let from = crate::locate::col_to_byte(line, selection.start.col);
    let to = crate::locate::col_to_byte(line, selection.end.col);
    Found::from_bytes(line, from, to)
}

/// One overlay value when every selection reads the same, otherwise the
/// unresolved placeholder.
fn aggregate(target: &Target, readings: &[Reading]) -> Option<Feedback> {
    let (first, rest) = readings.split_first()?;
    if rest.iter().all(|reading| reading.key == first.key) {
        return Some(Feedback::new(first.name.clone(), first.value.clone()));
    }
    Some(if target.is_number() {
        Feedback::new(first.name.clone(), plus_minus("?"))
    } else {
        Feedback::unresolved(first.name.clone())
    })
}
