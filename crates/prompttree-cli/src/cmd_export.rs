use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::session::{Session, format_document, load_tree, read_input};

pub fn run_export(session_path: PathBuf, output: Option<PathBuf>, pretty: bool) -> Result<()> {
    let session = Session::open(&session_path)?;
    let json = format_document(&session.nav().tree().serialize(), pretty)?;
    if let Some(path) = &output {
        std::fs::write(path, format!("{json}\n"))
            .with_context(|| format!("Failed to write {:?}", path))?;
        eprintln!("Exported {} nodes to {}", session.nav().tree().len(), path.display());
    } else {
        println!("{json}");
    }
    Ok(())
}

/// Replace the session's tree with the document at `input`.
///
/// The session file is only rewritten once the document has been fully
/// validated; a rejected import leaves it untouched.
pub fn run_import(session_path: PathBuf, input: PathBuf) -> Result<()> {
    let count = import(&session_path, &input)?;
    println!("Imported {count} nodes; cursor reset to the root.");
    Ok(())
}

fn import(session_path: &Path, input: &Path) -> Result<usize> {
    let mut session = Session::open(session_path)?;
    let content = read_input(Some(input))?;
    let tree = match load_tree(&content) {
        Ok(tree) => tree,
        Err(e) => {
            log::warn!("import rejected, keeping {}: {e:#}", session_path.display());
            return Err(e);
        }
    };
    let count = tree.len();
    session.nav_mut().replace_tree(tree);
    session.save()?;
    log::info!("imported {count} nodes into {}", session_path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompttree::v1::PromptTree;
    use tempfile::TempDir;

    fn seeded(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("s.json");
        let mut session = Session::create(&path, PromptTree::seed(), false).unwrap();
        session.nav_mut().move_to_id("evaluation").unwrap();
        session.save().unwrap();
        path
    }

    #[test]
    fn test_export_to_file_roundtrips() {
        let dir = TempDir::new().unwrap();
        let path = seeded(&dir);
        let out = dir.path().join("doc.json");
        run_export(path, Some(out.clone()), true).unwrap();
        let tree = load_tree(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(tree.serialize(), PromptTree::seed().serialize());
    }

    #[test]
    fn test_import_replaces_tree_and_resets_cursor() {
        let dir = TempDir::new().unwrap();
        let path = seeded(&dir);
        let doc = dir.path().join("doc.json");
        std::fs::write(
            &doc,
            r#"{"id":"r","title":"R","prompt":"","children":[{"id":"x","title":"X"}]}"#,
        )
        .unwrap();
        assert_eq!(import(&path, &doc).unwrap(), 2);
        let session = Session::open(&path).unwrap();
        assert_eq!(session.nav().tree().root_id().as_str(), "r");
        assert!(session.nav().state().path().is_root());
    }

    #[test]
    fn test_rejected_import_leaves_session_untouched() {
        let dir = TempDir::new().unwrap();
        let path = seeded(&dir);
        let before = std::fs::read_to_string(&path).unwrap();
        let doc = dir.path().join("doc.json");
        std::fs::write(
            &doc,
            r#"{"id":"r","title":"R","children":[{"id":"r","title":"again"}]}"#,
        )
        .unwrap();
        let err = import(&path, &doc).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate node id: r"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_import_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = seeded(&dir);
        assert!(import(&path, Path::new("/nonexistent/doc.json")).is_err());
    }
}
