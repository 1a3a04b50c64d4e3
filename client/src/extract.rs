use anyhow::Result;
use corpus::{
    action_type_stats, seeded_rng, shuffle, ActionTypeStats, CorpusWriter, Diagnostics,
    ExtractOptions, FileLog, GameRecord, Reconstructor, Sample, Split, Task,
};
use features::{EncodingOptions, Layout, LayoutError};
use log::{info, warn};
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::fs;

struct TaskOutput {
    task: Task,
    writer: CorpusWriter,
    rng: StdRng,
    diagnostics: Diagnostics,
}

/// The samples of every task in one game, in task order.
struct GameOutput {
    samples: Vec<Vec<Sample>>,
    diagnostics: Vec<Diagnostics>,
}

pub fn extract(options: &ExtractOptions, encoding: &EncodingOptions) -> Result<()> {
    let layout = Layout::new(encoding.layout)?;
    let reconstructor = Reconstructor::new(layout.clone(), options.epsilon);
    let log = FileLog::new(options.games_dir.clone())?;

    info!(
        "Extracting tasks {:?} with the {} layout (state {}, action {})",
        options.tasks.iter().map(|task| task.name()).collect::<Vec<_>>(),
        layout.version(),
        layout.len(),
        layout.action_len()
    );

    for (split, range) in [(Split::Train, options.train), (Split::Test, options.test)] {
        let mut outputs = options
            .tasks
            .iter()
            .map(|task| {
                Ok(TaskOutput {
                    task: *task,
                    writer: CorpusWriter::create(&options.output_dir, split, *task, &layout)?,
                    rng: seeded_rng(options.shuffle_seed, split, *task),
                    diagnostics: Diagnostics::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let game_ids: Vec<u64> = range.ids().collect();
        let mut skipped_games = 0;

        for batch in game_ids.chunks(options.batch_size) {
            let results: Vec<(u64, Result<Option<GameOutput>>)> = batch
                .par_iter()
                .map(|game_id| {
                    let output = log.load(*game_id).and_then(|record| {
                        record
                            .map(|record| extract_game(&reconstructor, &record, &options.tasks))
                            .transpose()
                    });
                    (*game_id, output)
                })
                .collect();

            let mut batch_samples: Vec<Vec<Sample>> = outputs.iter().map(|_| vec![]).collect();
            for (game_id, result) in results {
                match result {
                    Ok(Some(game)) => {
                        let per_task = game.samples.into_iter().zip(game.diagnostics);
                        for (i, (samples, diagnostics)) in per_task.enumerate() {
                            batch_samples[i].extend(samples);
                            outputs[i].diagnostics.extend(diagnostics);
                        }
                    }
                    Ok(None) => {}
                    Err(err) if err.downcast_ref::<LayoutError>().is_some() => return Err(err),
                    Err(err) => {
                        warn!("Skipping game {}: {:#}", game_id, err);
                        skipped_games += 1;
                    }
                }
            }

            for (output, mut samples) in outputs.iter_mut().zip(batch_samples) {
                shuffle(&mut samples, &mut output.rng);
                output.writer.append(&samples)?;
            }
        }

        for output in outputs {
            let num_samples = output.writer.num_samples();
            let metadata = output.writer.finish()?;
            info!(
                "{} {}: {} samples, largest set of actions {}, {} diagnostics",
                split,
                output.task,
                num_samples,
                metadata.largest_action_set,
                output.diagnostics.len()
            );
            for (kind, count) in output.diagnostics.summary() {
                info!("    {}: {}", kind, count);
            }
        }

        if skipped_games > 0 {
            warn!("{} {} games could not be read", skipped_games, split);
        }
    }

    Ok(())
}

fn extract_game(reconstructor: &Reconstructor, record: &GameRecord, tasks: &[Task]) -> Result<GameOutput> {
    let mut output = GameOutput {
        samples: Vec::with_capacity(tasks.len()),
        diagnostics: Vec::with_capacity(tasks.len()),
    };

    for task in tasks {
        let mut diagnostics = Diagnostics::new();
        let samples = reconstructor.extract(record, record.game_id, *task, &mut diagnostics)?;
        output.samples.push(samples);
        output.diagnostics.push(diagnostics);
    }

    Ok(output)
}

/// Tallies legal and chosen action types over every game in the games directory.
pub fn action_types(options: &ExtractOptions) -> Result<()> {
    let log = FileLog::new(options.games_dir.clone())?;
    let game_ids = log.game_ids()?;
    info!("Counting action types over {} games", game_ids.len());

    let results: Vec<Result<(ActionTypeStats, Diagnostics)>> = game_ids
        .par_iter()
        .map(|game_id| {
            let mut diagnostics = Diagnostics::new();
            let stats = match log.load(*game_id)? {
                Some(record) => action_type_stats(&record, *game_id, &mut diagnostics)?,
                None => ActionTypeStats::new(),
            };
            Ok((stats, diagnostics))
        })
        .collect();

    let mut stats = ActionTypeStats::new();
    let mut diagnostics = Diagnostics::new();
    for (game_id, result) in game_ids.iter().zip(results) {
        match result {
            Ok((game_stats, game_diagnostics)) => {
                stats.merge(game_stats);
                diagnostics.extend(game_diagnostics);
            }
            Err(err) => warn!("Skipping game {}: {:#}", game_id, err),
        }
    }

    fs::create_dir_all(&options.output_dir)?;
    let file_path = options.output_dir.join("action-type-stats.txt");
    fs::write(&file_path, stats.to_string())?;

    info!(
        "{} decisions written to {:?}, {} skipped",
        stats.num_decisions(),
        file_path,
        diagnostics.len()
    );

    Ok(())
}
