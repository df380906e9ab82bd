use std::path::{Path, PathBuf};

use anyhow::Context;
use retarget::retarget::FileJob;

/// Turn the command-line inputs into jobs.
///
/// A file lands directly in `output`; the files of a directory input keep their path relative
/// to that directory.
pub fn collect_jobs(inputs: &[PathBuf], output: &Path) -> anyhow::Result<Vec<FileJob>> {
    let mut jobs = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for file in collect_modules(input)? {
                let relative = file
                    .strip_prefix(input)
                    .with_context(|| format!("{} is outside {}", file.display(), input.display()))?;
                jobs.push(FileJob::new(file.clone(), output.join(relative)));
            }
        } else {
            let name = input
                .file_name()
                .with_context(|| format!("not a file path: {}", input.display()))?;
            jobs.push(FileJob::new(input.clone(), output.join(name)));
        }
    }
    Ok(jobs)
}

/// Collect all `.exe` and `.dll` files recursively from a directory.
pub fn collect_modules(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_modules_recursive(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_modules_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_modules_recursive(&path, files)?;
        } else if is_module_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Returns true if the path has an `.exe` or `.dll` extension.
pub fn is_module_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("exe" | "dll")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_directory_layout() {
        let input = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(input.path().join("Plugins/x64")).unwrap();
        std::fs::write(input.path().join("Game.dll"), b"").unwrap();
        std::fs::write(input.path().join("Plugins/x64/Native.dll"), b"").unwrap();
        std::fs::write(input.path().join("readme.txt"), b"").unwrap();

        let output = Path::new("/out");
        let jobs = collect_jobs(&[input.path().to_path_buf()], output).unwrap();

        let outputs: Vec<&Path> = jobs.iter().map(|j| j.output.as_path()).collect();
        assert_eq!(
            outputs,
            [
                Path::new("/out/Game.dll"),
                Path::new("/out/Plugins/x64/Native.dll")
            ]
        );
    }

    #[test]
    fn file_inputs_land_in_output_root() {
        let jobs = collect_jobs(
            &[PathBuf::from("build/bin/Assembly-CSharp.dll")],
            Path::new("out"),
        )
        .unwrap();
        assert_eq!(jobs[0].output, Path::new("out/Assembly-CSharp.dll"));
        assert_eq!(jobs[0].input, Path::new("build/bin/Assembly-CSharp.dll"));
    }

    #[test]
    fn module_extensions() {
        assert!(is_module_file(Path::new("a/Game.dll")));
        assert!(is_module_file(Path::new("Game.exe")));
        assert!(!is_module_file(Path::new("Game.pdb")));
        assert!(!is_module_file(Path::new("dll")));
    }
}
