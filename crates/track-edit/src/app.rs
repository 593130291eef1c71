use crate::dataset::{self, dataset_key};
use crate::settings::{Command, Settings};
use crate::snap::nearest_point_index;
use crate::storage::{FileStorage, StorageBackend, save_json_backend};
use crate::CliError;
use std::io::Write as _;
use track_edit_lib::{EditError, Engine, FeatureCollection, OperationLog, diff, parse_log};

/// Execute one command against the dataset named in `settings`
pub fn run(settings: Settings) -> Result<(), CliError> {
    profiling::scope!("run");

    let storage = FileStorage::new_with_path(settings.storage.clone())?;
    let key = dataset_key(&settings.dataset);

    if let Command::Reset = settings.command {
        storage.remove(&key)?;
        tracing::info!(dataset = %key, "Dropped saved edit log");
        return Ok(());
    }

    let base = dataset::load(&settings.dataset)?;
    let saved = if settings.ignore_saved {
        OperationLog::new()
    } else {
        load_saved_log(&storage, &key)?
    };

    let mut engine = Engine::new(base, saved);
    engine.subscribe(|state| {
        tracing::debug!(
            features = state.len(),
            points = state.total_points(),
            "State updated"
        );
    });
    // A saved log that no longer replays is reported before anything is appended;
    // only `undo` may go on, to walk the log back
    let resumed = engine.update().map(|_| ());
    let recovering = match resumed {
        Ok(()) => false,
        Err(err) if matches!(settings.command, Command::Undo) => {
            tracing::warn!(dataset = %key, error = %err, "Saved edit log does not apply");
            true
        }
        Err(err) => {
            tracing::error!(
                dataset = %key,
                "Saved edit log does not apply; run `undo` to drop its last operation or `reset` to drop it all"
            );
            return Err(err.into());
        }
    };

    match &settings.command {
        Command::Show | Command::Reset => {}
        Command::Edit { feature, target } => {
            let target = dataset::load_target(target)?;
            let state = engine.current_state()?;
            let current = state
                .get(*feature)
                .ok_or(EditError::IndexOutOfRange {
                    index: *feature,
                    len: state.len(),
                })?
                .coordinates()
                .to_vec();

            let script = diff(&current, &target);
            if script.is_empty() {
                tracing::info!(feature, "Target matches the current track, nothing to record");
            } else {
                engine.edit(*feature, script)?;
            }
        }
        Command::Split { feature, point, at } => {
            let point_index = match (point, at) {
                (Some(point), _) => *point,
                (None, Some(position)) => snap_to_feature(&mut engine, *feature, position)?,
                (None, None) => return Err(CliError::MissingSplitPoint),
            };
            engine.split(*feature, point_index)?;
        }
        Command::Merge { features } => {
            engine.merge(features.clone())?;
        }
        Command::Undo if recovering => {
            engine.discard_last();
        }
        Command::Undo => {
            engine.undo()?;
        }
        Command::Log => {
            return write_output(&settings, &describe_log(&engine)?);
        }
    }

    if settings.command.mutates() {
        save_json_backend(&storage, &key, &engine.serialize())?;
        tracing::info!(
            dataset = %key,
            operations = engine.log().len(),
            storage = %storage.path().display(),
            "Saved edit log"
        );
    }

    let state = engine.current_state()?;
    write_output(&settings, &render_state(state)?)
}

fn load_saved_log(storage: &FileStorage, key: &str) -> Result<OperationLog, CliError> {
    match storage.get_string(key)? {
        Some(json) => {
            let log = parse_log(&json)?;
            tracing::info!(dataset = %key, operations = log.len(), "Resuming saved edit log");
            Ok(log)
        }
        None => Ok(OperationLog::new()),
    }
}

fn snap_to_feature(
    engine: &mut Engine,
    feature: usize,
    position: &track_edit_lib::Coordinate,
) -> Result<usize, CliError> {
    let state = engine.current_state()?;
    let track = state.get(feature).ok_or(EditError::IndexOutOfRange {
        index: feature,
        len: state.len(),
    })?;
    let point = nearest_point_index(position, track.coordinates())
        .ok_or(CliError::EmptyFeature { index: feature })?;
    tracing::info!(feature, point, "Snapped split position to nearest point");
    Ok(point)
}

fn render_state(state: &FeatureCollection) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(state)?)
}

fn describe_log(engine: &Engine) -> Result<String, CliError> {
    let lineage = engine.lineage()?;

    let mut out: String = engine
        .log()
        .iter()
        .enumerate()
        .map(|(index, op)| format!("{index:>4}  {op}\n"))
        .collect();
    out.push_str(&format!(
        "{} operations, {} features, tree depth {} ({} rows)\n",
        engine.log().len(),
        lineage.depths().len(),
        lineage.max_depth(),
        lineage.rows()
    ));
    out.push_str(&format!("depths: {:?}\n", lineage.depths()));
    Ok(out)
}

fn write_output(settings: &Settings, text: &str) -> Result<(), CliError> {
    match &settings.output {
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!(path = %path.display(), "Wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
