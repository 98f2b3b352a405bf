mod args;

use args::Args;
use clap::Parser;
use georef_editor::{
    display::MapDisplay,
    pipeline::{Outcome, Pipeline},
    repl,
    session::{Session, SessionError},
    terminal::TerminalDisplay,
    translate::GdalConverter,
};
use std::{fs, io, process::ExitCode, sync::Arc};

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");

            ExitCode::FAILURE
        }
    }
}

/// Drops the input file and applies the initial flags. Errors are already shown
/// by the session's display.
fn load<D: MapDisplay>(
    session: &mut Session<D>,
    name: String,
    contents: Vec<u8>,
    gcps: Option<&str>,
) -> Result<(), SessionError> {
    session.drop_file(name, contents)?;

    if let Some(gcps) = gcps {
        session.submit_gcp_flags(gcps)?;
    }

    Ok(())
}

fn try_main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.debug { "debug" } else { "info" }),
    )
    .init();

    let contents = fs::read(&args.input_file).map_err(|e| format!("Error reading input: {e}"))?;

    let name = args
        .input_file
        .file_name()
        .ok_or("Input file has no name")?
        .to_string_lossy()
        .into_owned();

    let viewport = args.viewport_bounds();

    log::info!("Viewport {viewport}");

    let pipeline = Pipeline::new(Arc::new(GdalConverter), args.convert_options());

    let mut session = Session::new(TerminalDisplay::new(Some(viewport)), pipeline);

    if load(&mut session, name, contents, args.gcps.as_deref()).is_err() {
        return Ok(ExitCode::FAILURE);
    }

    let output_file = match args.output_file {
        Some(ref output_file) => output_file.clone(),
        None => {
            let export_name = session
                .input()
                .map(|input| input.referenced_name())
                .ok_or("No input file loaded")?;

            args.input_file.with_file_name(export_name)
        }
    };

    if args.interactive {
        repl::run(
            &mut session,
            io::stdin().lock(),
            &mut io::stdout(),
            &output_file,
            args.overwrite,
        )?;

        return Ok(ExitCode::SUCCESS);
    }

    if let Some(Outcome::Failed(e)) = session.wait() {
        return Err(format!("Error converting: {e}").into());
    }

    session.export()?.write_to(&output_file, args.overwrite)?;

    log::info!("Written {}", output_file.display());

    Ok(ExitCode::SUCCESS)
}
