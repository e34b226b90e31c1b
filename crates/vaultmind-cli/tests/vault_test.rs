//! Vault loading from a real directory tree.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use vaultmind_cli::Vault;
use vaultmind_core::{NoteIndex, NoteSource};
use vaultmind_rag::resolve;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn sample_vault() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "Cooking/Popcorn Recipe.md",
        "---\ntags: [snack]\n---\nHeat oil, add [[Corn]]. #quick\n",
    );
    write(root, "Cooking/Pasta.md", "Boil water. #dinner\n");
    write(root, "Garden/Corn.md", "# Corn\nA cereal.\n");
    write(root, "MOC_Food.md", "[[Popcorn Recipe]] [[Pasta]]\n");
    write(root, "notes.txt", "not markdown");
    write(root, ".obsidian/workspace.md", "hidden");
    dir
}

#[test]
fn test_loads_markdown_notes_only() {
    let dir = sample_vault();
    let vault = Vault::open(dir.path()).unwrap();
    let notes = vault.notes().unwrap();

    let mut titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["Corn", "MOC_Food", "Pasta", "Popcorn Recipe"]);
}

#[test]
fn test_paths_are_relative_with_forward_slashes() {
    let dir = sample_vault();
    let index = NoteIndex::from_source(&Vault::open(dir.path()).unwrap());
    assert_eq!(index.get("Popcorn Recipe").unwrap().path, "Cooking/Popcorn Recipe.md");
    assert_eq!(index.get("MOC_Food").unwrap().path, "MOC_Food.md");
}

#[test]
fn test_tags_from_front_matter_and_body() {
    let dir = sample_vault();
    let index = NoteIndex::from_source(&Vault::open(dir.path()).unwrap());
    let popcorn = index.get("Popcorn Recipe").unwrap();
    assert!(popcorn.has_tag("#snack"));
    assert!(popcorn.has_tag("#quick"));
    assert!(!popcorn.body.contains("tags:"));
    // Headings are not tags.
    assert!(index.get("Corn").unwrap().tags.is_empty());
}

#[test]
fn test_scopes_over_loaded_vault() {
    let dir = sample_vault();
    let index = NoteIndex::from_source(&Vault::open(dir.path()).unwrap());

    let folder = resolve("@Folder/Cooking what to cook", &index, None);
    let mut titles = folder.candidate_titles();
    titles.sort();
    assert_eq!(titles, vec!["Pasta", "Popcorn Recipe"]);

    let tagged = resolve("@Tag:#dinner ideas", &index, None);
    assert_eq!(tagged.candidate_titles(), vec!["Pasta"]);

    assert_eq!(index.moc_titles(), vec!["MOC_Food"]);
    let connected: Vec<&str> = index
        .connected("Corn")
        .iter()
        .map(|n| n.title.as_str())
        .collect();
    assert_eq!(connected, vec!["Popcorn Recipe"]);
}

#[test]
fn test_create_note_never_overwrites() {
    let dir = sample_vault();
    let vault = Vault::open(dir.path()).unwrap();

    let path = vault.create_note("Fresh.md", "new").unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), "new");
    assert!(vault.create_note("MOC_Food.md", "clobber").is_err());
    assert_eq!(
        fs::read_to_string(dir.path().join("MOC_Food.md")).unwrap(),
        "[[Popcorn Recipe]] [[Pasta]]\n"
    );
}

#[test]
fn test_create_note_stays_inside_vault() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("vault");
    fs::create_dir(&root).unwrap();
    let vault = Vault::open(&root).unwrap();

    for name in ["../escaped.md", "sub/nested.md", "/tmp/absolute.md", "..", ""] {
        assert!(vault.create_note(name, "x").is_err(), "accepted {name:?}");
    }
    assert!(!dir.path().join("escaped.md").exists());
    assert!(!root.join("sub").exists());
}

#[test]
fn test_read_active_note() {
    let dir = sample_vault();
    let vault = Vault::open(dir.path()).unwrap();
    let note = vault.read_note(Path::new("Garden/Corn.md")).unwrap();
    assert_eq!(note.title, "Corn");
    assert_eq!(note.path, "Garden/Corn.md");
}

#[test]
fn test_missing_vault_is_error() {
    assert!(Vault::open("/definitely/not/a/vault").is_err());
}
