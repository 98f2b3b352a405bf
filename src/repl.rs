use crate::{display::MapDisplay, gcp::GcpId, session::Session};
use geo::{Coord, coord};
use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

pub const HELP: &str = "\
Commands:
  down <id>               grab GCP marker <id>
  move <lon> <lat>        move the grabbed marker (preview only)
  up <lon> <lat>          release the grabbed marker at <lon> <lat>
  drag <id> <lon> <lat>   down, move and up in one go
  gcp -gcp <x> <y> <lon> <lat> ...
                          replace all GCPs (lines starting with -gcp work too)
  undo                    restore the GCPs before the last change
  reset                   default GCPs for the current viewport
  show                    list GCPs and their ogr2ogr flags
  show json               GCPs as JSON
  write [path]            save the referenced GeoJSON
  help                    this text
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Down(GcpId),
    Move(Coord<f64>),
    Up(Coord<f64>),
    Drag(GcpId, Coord<f64>),
    Gcp(String),
    Undo,
    Reset,
    Show,
    ShowJson,
    Write(Option<PathBuf>),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();

        if line.starts_with(crate::codec::GCP_FLAG) {
            return Ok(Self::Gcp(line.to_string()));
        }

        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let rest = rest.trim();

        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match (name, &args[..]) {
            ("down", [id]) => Self::Down(parse_id(id)?),
            ("move", [lon, lat]) => Self::Move(parse_position(lon, lat)?),
            ("up", [lon, lat]) => Self::Up(parse_position(lon, lat)?),
            ("drag", [id, lon, lat]) => Self::Drag(parse_id(id)?, parse_position(lon, lat)?),
            ("gcp", [_, ..]) => Self::Gcp(rest.to_string()),
            ("undo", []) => Self::Undo,
            ("reset", []) => Self::Reset,
            ("show", []) => Self::Show,
            ("show", ["json"]) => Self::ShowJson,
            ("write", []) => Self::Write(None),
            ("write", [_, ..]) => Self::Write(Some(PathBuf::from(rest))),
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            (
                "down" | "move" | "up" | "drag" | "gcp" | "undo" | "reset" | "show" | "help"
                | "quit",
                _,
            ) => return Err(format!("Wrong arguments for \"{name}\", see help")),
            _ => return Err(format!("Unknown command \"{name}\", see help")),
        };

        Ok(command)
    }
}

fn parse_id(id: &str) -> Result<GcpId, String> {
    id.parse().map_err(|e| format!("Invalid GCP id \"{id}\": {e}"))
}

fn parse_position(lon: &str, lat: &str) -> Result<Coord<f64>, String> {
    let parse = |value: &str| {
        value
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .ok_or_else(|| format!("Invalid coordinate \"{value}\""))
    };

    Ok(coord! { x: parse(lon)?, y: parse(lat)? })
}

/// Reads commands from `input` until `quit` or end of input. Errors of
/// individual commands are reported and do not stop the loop.
pub fn run<D: MapDisplay>(
    session: &mut Session<D>,
    input: impl BufRead,
    out: &mut impl Write,
    default_output: &Path,
    overwrite: bool,
) -> io::Result<()> {
    writeln!(out, "Type \"help\" for commands.")?;

    for line in input.lines() {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{e}")?;

                continue;
            }
        };

        if command == Command::Quit {
            break;
        }

        execute(session, command, out, default_output, overwrite)?;

        session.poll();
    }

    Ok(())
}

fn execute<D: MapDisplay>(
    session: &mut Session<D>,
    command: Command,
    out: &mut impl Write,
    default_output: &Path,
    overwrite: bool,
) -> io::Result<()> {
    match command {
        Command::Down(id) => session.pointer_down(Some(id)),
        Command::Move(position) => session.pointer_move(position),
        Command::Up(position) => release(session, position),
        Command::Drag(id, position) => {
            session.pointer_down(Some(id));
            session.pointer_move(position);
            release(session, position);
        }
        Command::Gcp(flags) => {
            if let Err(e) = session.submit_gcp_flags(&flags) {
                log::debug!("Flags rejected: {e}");
            }
        }
        Command::Undo => {
            if !session.undo() {
                writeln!(out, "Nothing to undo")?;
            }
        }
        Command::Reset => {
            if let Err(e) = session.reset_gcps() {
                log::debug!("Reset failed: {e}");
            }
        }
        Command::Show => {
            for gcp in session.gcps() {
                writeln!(out, "{gcp}")?;
            }

            writeln!(out, "{}", crate::codec::encode(session.gcps()))?;
        }
        Command::ShowJson => {
            serde_json::to_writer_pretty(&mut *out, session.gcps()).map_err(io::Error::other)?;

            writeln!(out)?;
        }
        Command::Write(path) => {
            session.wait();

            let path = path.as_deref().unwrap_or(default_output);

            match session.export() {
                Ok(export) => match export.write_to(path, overwrite) {
                    Ok(()) => writeln!(out, "Written {}", path.display())?,
                    Err(e) => writeln!(out, "Error writing {}: {e}", path.display())?,
                },
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }

    Ok(())
}

fn release<D: MapDisplay>(session: &mut Session<D>, position: Coord<f64>) {
    if let Err(e) = session.pointer_up(position) {
        log::debug!("Drag not applied: {e}");
    }
}
