use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

pub trait FsExt {
    // Converts the provided relative path to be based from the path of the currently working directory.
    // If the path is absolute, then it returns the absolute path.
    fn relative_to_cwd(&self) -> Result<PathBuf>
    where
        Self: AsRef<Path>,
    {
        let cwd_dir = std::env::current_dir()?;

        Ok(cwd_dir.join(self))
    }
}

impl FsExt for String {}

impl FsExt for &'static str {}

impl FsExt for PathBuf {}

pub fn assert_dir_exists<P: AsRef<Path>>(dir: P) -> Result<()> {
    if dir.as_ref().is_dir() {
        Ok(())
    } else {
        Err(anyhow!("{:?} is not a valid directory", dir.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_is_kept() {
        let path = "/tmp/games".relative_to_cwd().unwrap();
        assert_eq!(path, PathBuf::from("/tmp/games"));
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        assert!(assert_dir_exists("/definitely/not/a/dir").is_err());
        assert!(assert_dir_exists(std::env::temp_dir()).is_ok());
    }
}
