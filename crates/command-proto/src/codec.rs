//! JSON wire codec.
//!
//! Encoding always produces the canonical shape. Decoding is deliberately
//! lenient: a non-list top level is an error, but malformed steps and
//! unknown commands inside an otherwise valid sequence are logged and
//! skipped so the rest of the sequence still dispatches.

use crate::{Command, CommandSequence, CommandStep, ProtoError, Result, ShootMode};
use serde_json::{json, Value};
use tracing::warn;

pub fn encode_step(step: &CommandStep) -> String {
    step_value(step).to_string()
}

pub fn encode_sequence(seq: &CommandSequence) -> String {
    Value::Array(seq.steps.iter().map(step_value).collect()).to_string()
}

fn step_value(step: &CommandStep) -> Value {
    Value::Array(
        step.commands
            .iter()
            .map(|c| json!({ "cmd": c.name(), "val": val_value(c) }))
            .collect(),
    )
}

fn val_value(cmd: &Command) -> Value {
    // Shoot carries an integral count; everything else is a plain number.
    match cmd {
        Command::Shoot(ShootMode::AutoEngage) => json!(0),
        Command::Shoot(ShootMode::Burst(n)) => json!(n),
        other => json!(other.value()),
    }
}

pub fn decode_sequence(input: &str) -> Result<CommandSequence> {
    let root: Value = serde_json::from_str(input.trim())?;
    let Value::Array(raw_steps) = root else {
        return Err(ProtoError::NotASequence);
    };

    let mut steps = Vec::with_capacity(raw_steps.len());
    for raw in &raw_steps {
        match decode_step(raw) {
            Some(step) => steps.push(step),
            None => warn!(step = %raw, "skipping malformed command step"),
        }
    }
    Ok(CommandSequence::new(steps))
}

fn decode_step(raw: &Value) -> Option<CommandStep> {
    let entries = raw.as_array()?;
    let mut commands = Vec::with_capacity(entries.len());
    for entry in entries {
        match decode_command(entry) {
            Some(cmd) => commands.push(cmd),
            None => warn!(command = %entry, "skipping malformed command"),
        }
    }
    // A step the interpreter emitted as [] stays empty; a step whose every
    // entry was malformed is dropped entirely.
    if commands.is_empty() && !entries.is_empty() {
        return None;
    }
    Some(CommandStep::new(commands))
}

fn decode_command(raw: &Value) -> Option<Command> {
    let name = raw.get("cmd")?.as_str()?;
    let val = coerce_val(raw.get("val")?)?;
    match name {
        "move" => Some(Command::Move(val)),
        "steer" => Some(Command::Steer(val)),
        "rotate_x" => Some(Command::RotateX(val)),
        "rotate_y" => Some(Command::rotate_y(val)),
        "shoot" => decode_shoot(val),
        _ => None,
    }
}

fn decode_shoot(val: f64) -> Option<Command> {
    if val == 0.0 {
        Some(Command::Shoot(ShootMode::AutoEngage))
    } else if val > 0.0 && val.fract() == 0.0 && val <= f64::from(u32::MAX) {
        Some(Command::Shoot(ShootMode::Burst(val as u32)))
    } else {
        None
    }
}

/// The interpreter occasionally emits `val` as a quoted number; accept both.
fn coerce_val(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_order_and_grouping() -> Result<()> {
        let seq = CommandSequence::new(vec![
            CommandStep::single(Command::Steer(90.0)),
            CommandStep::single(Command::Move(-50.0)),
            CommandStep::single(Command::Move(50.0)),
            CommandStep::new(vec![
                Command::Steer(-90.0),
                Command::Shoot(ShootMode::Burst(10)),
            ]),
        ]);
        let decoded = decode_sequence(&encode_sequence(&seq))?;
        assert_eq!(decoded, seq);
        Ok(())
    }

    #[test]
    fn non_list_top_level_is_rejected() {
        assert!(matches!(
            decode_sequence(r#"{"cmd": "move", "val": 10}"#),
            Err(ProtoError::NotASequence)
        ));
        assert!(decode_sequence("not json at all").is_err());
    }

    #[test]
    fn empty_sequence_decodes_empty() -> Result<()> {
        let seq = decode_sequence("[]")?;
        assert!(seq.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_steps_are_skipped_not_fatal() -> Result<()> {
        let input = r#"[
            [{"cmd": "move", "val": 100}],
            {"cmd": "steer", "val": 45},
            [{"cmd": "warp", "val": 1}],
            [{"cmd": "steer", "val": -90}]
        ]"#;
        let seq = decode_sequence(input)?;
        assert_eq!(
            seq.steps,
            vec![
                CommandStep::single(Command::Move(100.0)),
                CommandStep::single(Command::Steer(-90.0)),
            ]
        );
        Ok(())
    }

    #[test]
    fn quoted_values_are_coerced() -> Result<()> {
        let seq = decode_sequence(r#"[[{"cmd": "move", "val": "30"}]]"#)?;
        assert_eq!(seq.steps, vec![CommandStep::single(Command::Move(30.0))]);
        Ok(())
    }

    #[test]
    fn rotate_y_is_clamped_on_decode() -> Result<()> {
        let seq = decode_sequence(r#"[[{"cmd": "rotate_y", "val": 60}]]"#)?;
        assert_eq!(
            seq.steps,
            vec![CommandStep::single(Command::RotateY(25.0))]
        );
        let seq = decode_sequence(r#"[[{"cmd": "rotate_y", "val": -60}]]"#)?;
        assert_eq!(
            seq.steps,
            vec![CommandStep::single(Command::RotateY(-25.0))]
        );
        Ok(())
    }

    #[test]
    fn shoot_values_split_into_modes() -> Result<()> {
        let seq = decode_sequence(
            r#"[[{"cmd": "shoot", "val": 0}], [{"cmd": "shoot", "val": 10}]]"#,
        )?;
        assert_eq!(
            seq.steps,
            vec![
                CommandStep::single(Command::Shoot(ShootMode::AutoEngage)),
                CommandStep::single(Command::Shoot(ShootMode::Burst(10))),
            ]
        );
        assert!(seq.steps[0].wants_auto_engage());
        assert!(!seq.steps[1].wants_auto_engage());
        Ok(())
    }

    #[test]
    fn negative_shoot_is_dropped() -> Result<()> {
        let seq = decode_sequence(r#"[[{"cmd": "shoot", "val": -1}]]"#)?;
        assert!(seq.is_empty());
        Ok(())
    }
}
