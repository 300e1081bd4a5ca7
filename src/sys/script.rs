use crate::events::DialEvent;
use crate::geometry::{Bounds, Point};
use async_channel::Sender;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One line of a gesture script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Event(DialEvent),
    Wait(Duration),
}

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: '{command}' takes {expected} argument(s), got {got}")]
    Arity {
        line: usize,
        command: String,
        expected: usize,
        got: usize,
    },
    #[error("line {line}: '{value}' is not a number")]
    BadNumber { line: usize, value: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parses `layout X Y W H`, `screen W`, `down X Y`, `move X Y`, `up X Y`,
/// `reset` and `wait MS`. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Command>, ScriptError> {
    let text = text.split('#').next().unwrap_or_default().trim();
    let mut words = text.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let args = words
        .map(|w| {
            w.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ScriptError::BadNumber {
                    line,
                    value: w.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let arity = |expected: usize| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(ScriptError::Arity {
                line,
                command: command.to_string(),
                expected,
                got: args.len(),
            })
        }
    };

    let cmd = match command.to_ascii_lowercase().as_str() {
        "layout" => {
            arity(4)?;
            Command::Event(DialEvent::Layout(Bounds::new(
                args[0], args[1], args[2], args[3],
            )))
        }
        "screen" => {
            arity(1)?;
            Command::Event(DialEvent::Screen(args[0]))
        }
        "down" => {
            arity(2)?;
            Command::Event(DialEvent::Down(Point::new(args[0], args[1])))
        }
        "move" => {
            arity(2)?;
            Command::Event(DialEvent::Move(Point::new(args[0], args[1])))
        }
        "up" => {
            arity(2)?;
            Command::Event(DialEvent::Up(Point::new(args[0], args[1])))
        }
        "reset" => {
            arity(0)?;
            Command::Event(DialEvent::Reset)
        }
        "wait" => {
            arity(1)?;
            Command::Wait(Duration::from_millis(args[0].max(0.0) as u64))
        }
        _ => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: command.to_string(),
            });
        }
    };

    Ok(Some(cmd))
}

/// Streams a script into the driver. Stops early if the driver went away.
pub async fn feed<R>(reader: R, tx: Sender<DialEvent>) -> Result<usize, ScriptError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0;
    let mut sent = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        match parse_line(line_no, &line)? {
            Some(Command::Event(event)) => {
                if tx.send(event).await.is_err() {
                    log::warn!("Dial driver stopped before the script ended");
                    break;
                }
                sent += 1;
            }
            Some(Command::Wait(delay)) => tokio::time::sleep(delay).await,
            None => {}
        }
    }

    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cases = vec![
            (
                "layout 50 50 100 100",
                Command::Event(DialEvent::Layout(Bounds::new(50.0, 50.0, 100.0, 100.0))),
            ),
            ("screen 400", Command::Event(DialEvent::Screen(400.0))),
            (
                "down 150 100",
                Command::Event(DialEvent::Down(Point::new(150.0, 100.0))),
            ),
            (
                "  MOVE 100.5 -3  # comment",
                Command::Event(DialEvent::Move(Point::new(100.5, -3.0))),
            ),
            (
                "up 1 2",
                Command::Event(DialEvent::Up(Point::new(1.0, 2.0))),
            ),
            ("reset", Command::Event(DialEvent::Reset)),
            ("wait 20", Command::Wait(Duration::from_millis(20))),
        ];

        for (line, expected) in cases {
            assert_eq!(parse_line(1, line).unwrap(), Some(expected), "{}", line);
        }
    }

    #[test]
    fn test_skip_blank_and_comments() {
        assert!(parse_line(1, "").unwrap().is_none());
        assert!(parse_line(2, "   # just a note").unwrap().is_none());
    }

    #[test]
    fn test_parse_errors_carry_line() {
        assert!(matches!(
            parse_line(3, "spin 1 2"),
            Err(ScriptError::UnknownCommand { line: 3, .. })
        ));
        assert!(matches!(
            parse_line(4, "down 1"),
            Err(ScriptError::Arity {
                line: 4,
                expected: 2,
                got: 1,
                ..
            })
        ));
        assert!(matches!(
            parse_line(5, "move 1 abc"),
            Err(ScriptError::BadNumber { line: 5, .. })
        ));
        assert!(matches!(
            parse_line(6, "move 1 NaN"),
            Err(ScriptError::BadNumber { line: 6, .. })
        ));
    }

    #[tokio::test]
    async fn test_feed_sends_events_in_order() {
        let script = "layout 50 50 100 100\n# drag\ndown 150 100\nwait 1\nmove 100 150\nup 100 150\n";
        let (tx, rx) = async_channel::unbounded();

        let sent = feed(script.as_bytes(), tx).await.unwrap();
        assert_eq!(sent, 4);

        let mut got = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            got.push(ev);
        }
        assert_eq!(got.len(), 4);
        assert_eq!(got[1], DialEvent::Down(Point::new(150.0, 100.0)));
        assert_eq!(got[3], DialEvent::Up(Point::new(100.0, 150.0)));
    }

    #[tokio::test]
    async fn test_feed_reports_bad_line() {
        let (tx, _rx) = async_channel::unbounded();
        let err = feed("down 1 2\nbogus\n".as_bytes(), tx).await.unwrap_err();
        assert!(matches!(err, ScriptError::UnknownCommand { line: 2, .. }));
    }
}
