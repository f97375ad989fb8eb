use std::path::{Component, Path, PathBuf};

/// Turns a command-line path into an absolute location without touching the
/// filesystem, so that paths which do not exist yet still resolve.
pub fn absolute_location(path: &Path, current_dir: &Path) -> PathBuf {
    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        current_dir.join(path)
    };

    normalize_path(&absolute_path)
}

/// Resolves `.` and `..` components lexically.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;
}

impl BestEffortPathExt for Path {
    fn best_effort_path_display(&self) -> String {
        self.to_string_lossy().into_owned()
    }
}

impl BestEffortPathExt for PathBuf {
    fn best_effort_path_display(&self) -> String {
        self.as_path().best_effort_path_display()
    }
}
