use anyhow::{Context, Result};
use features::{Layout, LayoutError, LayoutVersion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt::{self, Display, Formatter};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::sample::Sample;
use super::task::Task;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

impl Display for Split {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Vector sizes and the largest decision of one corpus file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub state_len: usize,
    pub action_len: usize,
    pub largest_action_set: usize,
}

impl Display for Metadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "State:{}", self.state_len)?;
        writeln!(f, "Action:{}", self.action_len)?;
        writeln!(f, "Largest set of actions:{}", self.largest_action_set)
    }
}

/// Writes the samples of one task and split to `{split}-{task}.txt`, one line per sample,
/// followed by `{split}-{task}-metadata.txt` once finished.
pub struct CorpusWriter {
    dir: PathBuf,
    split: Split,
    task: Task,
    version: LayoutVersion,
    writer: BufWriter<File>,
    metadata: Metadata,
    num_samples: usize,
}

impl CorpusWriter {
    pub fn create(dir: &Path, split: Split, task: Task, layout: &Layout) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;

        let file_path = dir.join(format!("{}-{}.txt", split, task.id()));
        let file = File::create(&file_path)
            .with_context(|| format!("Failed to create {:?}", file_path))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            split,
            task,
            version: layout.version(),
            writer: BufWriter::new(file),
            metadata: Metadata {
                state_len: layout.len(),
                action_len: layout.action_len(),
                largest_action_set: 0,
            },
            num_samples: 0,
        })
    }

    /// Appends a batch. Every vector must carry the writer's layout.
    pub fn append(&mut self, samples: &[Sample]) -> Result<()> {
        for sample in samples {
            self.check(sample)?;
            writeln!(self.writer, "{}", sample)?;

            self.metadata.largest_action_set =
                self.metadata.largest_action_set.max(sample.num_legal_actions());
            self.num_samples += 1;
        }

        Ok(())
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn finish(mut self) -> Result<Metadata> {
        self.writer.flush()?;

        let file_path = self
            .dir
            .join(format!("{}-{}-metadata.txt", self.split, self.task.id()));
        fs::write(&file_path, self.metadata.to_string())
            .with_context(|| format!("Failed to write {:?}", file_path))?;

        Ok(self.metadata)
    }

    fn check(&self, sample: &Sample) -> Result<(), LayoutError> {
        let found = std::iter::once(sample.state.version())
            .chain(sample.legal_actions.iter().map(|a| a.version()))
            .find(|v| *v != self.version);

        match found {
            Some(found) => Err(LayoutError::Mismatch {
                expected: self.version,
                found,
            }),
            None => Ok(()),
        }
    }
}

/// Shuffles a batch in place. The same seed and batch give the same order.
pub fn shuffle(samples: &mut [Sample], rng: &mut StdRng) {
    samples.shuffle(rng);
}

pub fn seeded_rng(seed: u64, split: Split, task: Task) -> StdRng {
    let salt = ((task.id() as u64) << 1) | (split == Split::Test) as u64;
    StdRng::seed_from_u64(seed.wrapping_add(salt))
}
