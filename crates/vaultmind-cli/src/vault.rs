//! Markdown vault on disk.
//!
//! Every `*.md` file under the root is a note. Hidden directories such as
//! `.obsidian` and `.git` are skipped. The title is the file stem, the path
//! is relative to the root with `/` separators, and tags come from the YAML
//! front matter `tags:` key plus inline hashtags in the body.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use vaultmind_core::{extract_inline_hashtags, Error, Note, NoteSource, Result};

/// A directory of markdown notes.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::NotFound(format!(
                "vault directory {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read one note by vault-relative or absolute path.
    pub fn read_note(&self, path: &Path) -> Result<Note> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let content = fs::read_to_string(&absolute)?;
        Ok(parse_note(&self.relative_path(&absolute), &content))
    }

    /// Write a new note at the vault root. Existing files are never replaced,
    /// and `file_name` must be a bare file name.
    pub fn create_note(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        let mut components = Path::new(file_name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(Error::InvalidInput(format!(
                "\"{}\" is not a plain file name",
                file_name
            )));
        }
        let path = self.root.join(file_name);
        if path.exists() {
            return Err(Error::InvalidInput(format!(
                "file \"{}\" already exists",
                file_name
            )));
        }
        fs::write(&path, content)?;
        debug!(path = %path.display(), "Note created");
        Ok(path)
    }

    /// Replace the content of an existing note.
    pub fn overwrite_note(&self, path: &Path, content: &str) -> Result<()> {
        let absolute = self.root.join(path);
        if !absolute.is_file() {
            return Err(Error::NotFound(format!("note {}", path.display())));
        }
        fs::write(absolute, content)?;
        Ok(())
    }

    fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl NoteSource for Vault {
    fn notes(&self) -> Result<Vec<Note>> {
        let mut notes = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable vault entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            match fs::read_to_string(entry.path()) {
                Ok(content) => notes.push(parse_note(&self.relative_path(entry.path()), &content)),
                Err(e) => warn!(path = %entry.path().display(), error = %e, "Skipping unreadable note"),
            }
        }

        debug!(
            subsystem = "cli",
            component = "vault",
            root = %self.root.display(),
            note_count = notes.len(),
            "Vault scanned"
        );
        Ok(notes)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Build a note from its vault-relative path and raw file content.
pub fn parse_note(relative_path: &str, content: &str) -> Note {
    let title = Path::new(relative_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| relative_path.to_string());

    let (front_matter, body) = split_front_matter(content);
    let mut tags = front_matter
        .as_ref()
        .map(front_matter_tags)
        .unwrap_or_default();
    tags.extend(extract_inline_hashtags(body));

    Note::new(title, relative_path, body).with_tags(tags)
}

/// Split leading `---` delimited YAML from the body.
///
/// Content without a closed front matter block is returned whole; front
/// matter that is not valid YAML is dropped.
pub fn split_front_matter(content: &str) -> (Option<serde_yaml::Value>, &str) {
    let rest = match content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    {
        Some(rest) => rest,
        None => return (None, content),
    };

    let closing = rest
        .find("\n---\n")
        .map(|i| (i, i + 5))
        .or_else(|| rest.find("\n---\r\n").map(|i| (i, i + 6)))
        .or_else(|| rest.ends_with("\n---").then(|| (rest.len() - 4, rest.len())));

    match closing {
        Some((yaml_end, body_start)) => {
            let front_matter = serde_yaml::from_str(&rest[..yaml_end]).ok();
            (front_matter, &rest[body_start..])
        }
        None => (None, content),
    }
}

/// Tags listed under `tags:`, as a sequence or a comma/space separated string.
fn front_matter_tags(front_matter: &serde_yaml::Value) -> Vec<String> {
    match front_matter.get("tags") {
        Some(serde_yaml::Value::Sequence(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        Some(serde_yaml::Value::String(s)) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_with_front_matter() {
        let content = "---\ntags: [cooking, \"#snack\"]\n---\nPop it. #quick\n";
        let note = parse_note("Cooking/Popcorn Recipe.md", content);
        assert_eq!(note.title, "Popcorn Recipe");
        assert_eq!(note.path, "Cooking/Popcorn Recipe.md");
        assert_eq!(note.body, "Pop it. #quick\n");
        assert!(note.has_tag("#cooking"));
        assert!(note.has_tag("#snack"));
        assert!(note.has_tag("#quick"));
    }

    #[test]
    fn test_string_tags() {
        let (fm, _) = split_front_matter("---\ntags: dinner, pasta\n---\n");
        let tags = front_matter_tags(&fm.unwrap());
        assert_eq!(tags, vec!["dinner", "pasta"]);
    }

    #[test]
    fn test_no_front_matter() {
        let (fm, body) = split_front_matter("# Title\nbody");
        assert!(fm.is_none());
        assert_eq!(body, "# Title\nbody");
    }

    #[test]
    fn test_unclosed_front_matter_kept_as_body() {
        let content = "---\ntags: [a]\nno closing";
        let (fm, body) = split_front_matter(content);
        assert!(fm.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn test_front_matter_at_end_of_file() {
        let (fm, body) = split_front_matter("---\ntags: [a]\n---");
        assert!(fm.is_some());
        assert_eq!(body, "");
    }
}
