//! Parsing of interactive session commands.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sentinel_core::Msg;

pub const HELP: &str = "\
commands:
  scan [path]          scan a project folder (default .)
  fix <instruction>    ask for project-wide fixes
  review <file>        open a proposed change
  accept | reject      decide on the change under review
  load <file>          put a file into the editor
  shot <image>         attach a screenshot for visual repair
  unshot               drop the attached screenshot
  analyze              analyze and repair the editor code
  save                 save the editor code
  show                 print the editor code
  sidebar              toggle the file tree
  ack                  dismiss the mission report
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Vec<Msg>),
    Load(PathBuf),
    Screenshot(PathBuf),
    Show,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "scan" => {
            let path = if rest.is_empty() { "." } else { rest };
            Command::Dispatch(vec![Msg::ScanRequested {
                path: path.to_string(),
            }])
        }
        "fix" => {
            if rest.is_empty() {
                return Err("fix needs an instruction".to_string());
            }
            Command::Dispatch(vec![
                Msg::InstructionChanged(rest.to_string()),
                Msg::BatchFixRequested,
            ])
        }
        "review" => {
            if rest.is_empty() {
                return Err("review needs a file name".to_string());
            }
            Command::Dispatch(vec![Msg::ReviewOpened {
                file_name: rest.to_string(),
            }])
        }
        "accept" => Command::Dispatch(vec![Msg::ReviewAccepted]),
        "reject" => Command::Dispatch(vec![Msg::ReviewRejected]),
        "analyze" => Command::Dispatch(vec![Msg::AnalyzeRequested]),
        "save" => Command::Dispatch(vec![Msg::SaveRequested]),
        "sidebar" => Command::Dispatch(vec![Msg::ToggleSidebar]),
        "ack" => Command::Dispatch(vec![Msg::MissionReportAcknowledged]),
        "unshot" => Command::Dispatch(vec![Msg::ScreenshotCleared]),
        "load" | "shot" if rest.is_empty() => {
            return Err(format!("{word} needs a file path"));
        }
        "load" => Command::Load(PathBuf::from(rest)),
        "shot" => Command::Screenshot(PathBuf::from(rest)),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

/// Read an image and encode it as a base64 data URL.
pub fn screenshot_data_url(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use sentinel_core::Msg;
    use tempfile::tempdir;

    use super::{parse_command, screenshot_data_url, Command};

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn scan_defaults_to_current_dir() {
        assert_eq!(
            parse_command("scan"),
            Ok(Some(Command::Dispatch(vec![Msg::ScanRequested {
                path: ".".to_string()
            }])))
        );
        assert_eq!(
            parse_command("scan  ../web "),
            Ok(Some(Command::Dispatch(vec![Msg::ScanRequested {
                path: "../web".to_string()
            }])))
        );
    }

    #[test]
    fn fix_sets_instruction_then_requests() {
        assert_eq!(
            parse_command("fix add docstrings everywhere"),
            Ok(Some(Command::Dispatch(vec![
                Msg::InstructionChanged("add docstrings everywhere".to_string()),
                Msg::BatchFixRequested,
            ])))
        );
        assert!(parse_command("fix").is_err());
    }

    #[test]
    fn file_commands_need_a_path() {
        assert!(parse_command("load").is_err());
        assert!(parse_command("shot").is_err());
        assert_eq!(
            parse_command("load src/app.py"),
            Ok(Some(Command::Load(PathBuf::from("src/app.py"))))
        );
    }

    #[test]
    fn unknown_command_is_reported() {
        let err = parse_command("deploy").unwrap_err();
        assert!(err.contains("deploy"));
    }

    #[test]
    fn screenshot_is_a_data_url() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shot.PNG");
        fs::write(&path, b"abc").unwrap();

        assert_eq!(
            screenshot_data_url(&path).unwrap(),
            "data:image/png;base64,YWJj"
        );
    }
}
