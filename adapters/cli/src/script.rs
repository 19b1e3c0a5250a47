use anyhow::{bail, Context, Result};
use maze_escape_core::{Direction, InputState};

/// Single instruction of a scripted simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScriptStep {
    /// Hold the input for the given number of ticks.
    Hold { input: InputState, ticks: u32 },
    /// Throw a projectile in the facing direction.
    Throw,
}

/// Parses a script such as `R16 D32 F W10`.
///
/// `U`, `D`, `L` and `R` hold a direction, `W` waits without input and `F`
/// throws. A direction or wait may carry a tick count, defaulting to one.
/// Tokens are separated by whitespace or commas.
pub(crate) fn parse(script: &str) -> Result<Vec<ScriptStep>> {
    script
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> Result<ScriptStep> {
    let mut chars = token.chars();
    let Some(command) = chars.next() else {
        bail!("empty script token");
    };
    let count = chars.as_str();

    let input = match command.to_ascii_uppercase() {
        'U' => InputState::holding(Direction::Up),
        'D' => InputState::holding(Direction::Down),
        'L' => InputState::holding(Direction::Left),
        'R' => InputState::holding(Direction::Right),
        'W' => InputState::IDLE,
        'F' if count.is_empty() => return Ok(ScriptStep::Throw),
        'F' => bail!("throw token `{token}` does not take a count"),
        _ => bail!("unknown script token `{token}`"),
    };

    let ticks = if count.is_empty() {
        1
    } else {
        count
            .parse::<u32>()
            .with_context(|| format!("invalid tick count in script token `{token}`"))?
    };

    Ok(ScriptStep::Hold { input, ticks })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_steps() {
        let steps = parse("R16, d2 F w").expect("script");
        assert_eq!(
            steps,
            vec![
                ScriptStep::Hold {
                    input: InputState::holding(Direction::Right),
                    ticks: 16
                },
                ScriptStep::Hold {
                    input: InputState::holding(Direction::Down),
                    ticks: 2
                },
                ScriptStep::Throw,
                ScriptStep::Hold {
                    input: InputState::IDLE,
                    ticks: 1
                },
            ]
        );
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert!(parse("R4 X2").is_err());
        assert!(parse("F3").is_err());
        assert!(parse("Rfast").is_err());
    }
}
