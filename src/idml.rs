//! IDML archive access.
//!
//! An IDML file is a ZIP container; each `Stories/<id>.xml` entry is one
//! story. Saving never touches the input file: a `<stem>.translated<ext>`
//! sibling is written instead, with every entry copied raw in its original
//! order except the stories whose markup changed.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::Result;
use crate::pipeline::StoryRepository;
use crate::story::Story;

const STORIES_DIR: &str = "Stories/";
const STORY_EXT: &str = ".xml";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads and writes stories of IDML archives on disk.
#[derive(Debug, Clone, Default)]
pub struct ZipIdmlRepository {
    /// Dump loaded and translated stories next to the archive.
    debug_files: bool,
}

impl ZipIdmlRepository {
    pub fn new(debug_files: bool) -> Self {
        ZipIdmlRepository { debug_files }
    }

    fn write_debug_stories(&self, original: &Path, stories: &[Story], label: &str) -> Result<()> {
        let dir = debug_dir(original, label);
        fs::create_dir_all(&dir)?;
        for story in stories {
            fs::write(dir.join(format!("{}{}", story.id, STORY_EXT)), &story.xml)?;
        }
        debug!(dir = %dir.display(), count = stories.len(), "wrote debug story dump");
        Ok(())
    }
}

impl StoryRepository for ZipIdmlRepository {
    fn load_stories(&self, path: &Path) -> Result<Vec<Story>> {
        info!(path = %path.display(), "reading idml archive");

        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut stories = Vec::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let Some(id) = story_id(entry.name()).map(str::to_string) else {
                continue;
            };

            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;
            let xml = String::from_utf8(strip_bom(&bytes).to_vec())?;
            stories.push(Story { id, xml });
        }

        stories.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(count = stories.len(), "loaded stories from idml");

        if self.debug_files {
            self.write_debug_stories(path, &stories, "loaded")?;
        }
        Ok(stories)
    }

    fn save_stories(&self, original: &Path, stories: &[Story]) -> Result<PathBuf> {
        info!(path = %original.display(), "writing translated idml archive");

        if self.debug_files {
            self.write_debug_stories(original, stories, "translated")?;
        }

        let mut pending: HashMap<&str, &Story> =
            stories.iter().map(|story| (story.id.as_str(), story)).collect();

        let mut archive = ZipArchive::new(File::open(original)?)?;
        let output = output_path(original);
        let mut zip = ZipWriter::new(File::create(&output)?);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9));

        let mut replaced = 0;
        for index in 0..archive.len() {
            let replacement = {
                let mut entry = archive.by_index(index)?;
                match story_id(entry.name()).and_then(|id| pending.remove(id)) {
                    Some(story) if !entry.is_dir() => {
                        let mut bytes = Vec::new();
                        entry.read_to_end(&mut bytes)?;
                        (strip_bom(&bytes) != story.xml.as_bytes())
                            .then(|| (entry.name().to_string(), story))
                    }
                    _ => None,
                }
            };

            match replacement {
                Some((name, story)) => {
                    zip.start_file(name, deflated)?;
                    zip.write_all(story.xml.as_bytes())?;
                    replaced += 1;
                }
                None => zip.raw_copy_file(archive.by_index_raw(index)?)?,
            }
        }

        // Stories the archive did not hold yet.
        let mut added: Vec<&Story> = pending.into_values().collect();
        added.sort_by(|a, b| a.id.cmp(&b.id));
        for story in added {
            zip.start_file(format!("{}{}{}", STORIES_DIR, story.id, STORY_EXT), deflated)?;
            zip.write_all(story.xml.as_bytes())?;
            replaced += 1;
        }

        zip.finish()?;
        info!(path = %output.display(), replaced, "wrote translated idml archive");
        Ok(output)
    }
}

/// Story id of an archive entry: the file stem of `Stories/<id>.xml`.
fn story_id(name: &str) -> Option<&str> {
    let file = name.strip_prefix(STORIES_DIR)?.strip_suffix(STORY_EXT)?;
    let id = file.rsplit('/').next().unwrap_or(file);
    (!id.is_empty()).then_some(id)
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<dir>/<stem>.translated<.ext>` for `<dir>/<stem><.ext>`.
pub fn output_path(original: &Path) -> PathBuf {
    let name = match original.extension() {
        Some(ext) => format!("{}.translated.{}", stem(original), ext.to_string_lossy()),
        None => format!("{}.translated", stem(original)),
    };
    original.with_file_name(name)
}

/// `<dir>/<stem>.<label>.stories` for debug dumps.
pub fn debug_dir(original: &Path, label: &str) -> PathBuf {
    original.with_file_name(format!("{}.{}.stories", stem(original), label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    const DESIGNMAP: &str = "<?xml version=\"1.0\"?><Document/>";
    const STORY_A: &str = "<Story Self=\"ua\"><ParagraphStyleRange><Content>A</Content></ParagraphStyleRange></Story>";
    const STORY_B: &str = "<Story Self=\"ub\"><ParagraphStyleRange><Content>B</Content></ParagraphStyleRange></Story>";

    fn write_idml(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("book.idml");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/vnd.adobe.indesign-idml-package").unwrap();
        zip.start_file("designmap.xml", deflated).unwrap();
        zip.write_all(DESIGNMAP.as_bytes()).unwrap();
        zip.add_directory("Stories/", deflated).unwrap();
        zip.start_file("Stories/Story_ub.xml", deflated).unwrap();
        zip.write_all(UTF8_BOM).unwrap();
        zip.write_all(STORY_B.as_bytes()).unwrap();
        zip.start_file("Stories/Story_ua.xml", deflated).unwrap();
        zip.write_all(STORY_A.as_bytes()).unwrap();
        zip.start_file("Spreads/Spread_1.xml", deflated).unwrap();
        zip.write_all(b"<Spread/>").unwrap();
        zip.finish().unwrap();
        path
    }

    fn read_entries(path: &Path) -> Vec<(String, Vec<u8>, CompressionMethod)> {
        let bytes = fs::read(path).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut entry = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                entry.read_to_end(&mut data).unwrap();
                (entry.name().to_string(), data, entry.compression())
            })
            .collect()
    }

    #[test]
    fn test_story_id() {
        assert_eq!(story_id("Stories/Story_u1.xml"), Some("Story_u1"));
        assert_eq!(story_id("Stories/"), None);
        assert_eq!(story_id("Spreads/Spread_1.xml"), None);
        assert_eq!(story_id("Stories/notes.txt"), None);
    }

    #[test]
    fn test_output_and_debug_paths() {
        let original = Path::new("/tmp/work/book.idml");
        assert_eq!(output_path(original), PathBuf::from("/tmp/work/book.translated.idml"));
        assert_eq!(
            debug_dir(original, "loaded"),
            PathBuf::from("/tmp/work/book.loaded.stories")
        );
        assert_eq!(
            output_path(Path::new("plain")),
            PathBuf::from("plain.translated")
        );
    }

    #[test]
    fn test_load_stories_sorted_without_bom() {
        let dir = TempDir::new().unwrap();
        let path = write_idml(&dir);

        let stories = ZipIdmlRepository::new(false).load_stories(&path).unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0], Story::new("Story_ua", STORY_A));
        assert_eq!(stories[1], Story::new("Story_ub", STORY_B));
        assert!(!dir.path().join("book.loaded.stories").exists());
    }

    #[test]
    fn test_save_replaces_changed_stories_only() {
        let dir = TempDir::new().unwrap();
        let path = write_idml(&dir);
        let repository = ZipIdmlRepository::new(false);

        let mut stories = repository.load_stories(&path).unwrap();
        stories[0].xml = STORY_A.replace(">A<", ">Ą<");

        let output = repository.save_stories(&path, &stories).unwrap();
        assert_eq!(output, dir.path().join("book.translated.idml"));

        let before = read_entries(&path);
        let after = read_entries(&output);
        let names = |entries: &[(String, Vec<u8>, CompressionMethod)]| {
            entries.iter().map(|e| e.0.clone()).collect::<Vec<_>>()
        };
        assert_eq!(names(&before), names(&after));

        assert_eq!(after[0].0, "mimetype");
        assert_eq!(after[0].2, CompressionMethod::Stored);
        assert_eq!(after[0].1, before[0].1);

        for (old, new) in before.iter().zip(&after) {
            if old.0 == "Stories/Story_ua.xml" {
                assert_eq!(new.1, stories[0].xml.as_bytes());
                assert_eq!(new.2, CompressionMethod::Deflated);
            } else {
                // Unchanged story keeps its BOM, other parts are untouched.
                assert_eq!(new.1, old.1, "entry {} changed", old.0);
            }
        }
    }

    #[test]
    fn test_save_appends_unknown_story() {
        let dir = TempDir::new().unwrap();
        let path = write_idml(&dir);
        let repository = ZipIdmlRepository::new(false);

        let stories = vec![Story::new("Story_new", "<Story/>")];
        let output = repository.save_stories(&path, &stories).unwrap();

        let after = read_entries(&output);
        let last = after.last().unwrap();
        assert_eq!(last.0, "Stories/Story_new.xml");
        assert_eq!(last.1, b"<Story/>");
    }

    #[test]
    fn test_debug_dumps() {
        let dir = TempDir::new().unwrap();
        let path = write_idml(&dir);
        let repository = ZipIdmlRepository::new(true);

        let stories = repository.load_stories(&path).unwrap();
        repository.save_stories(&path, &stories).unwrap();

        let loaded = dir.path().join("book.loaded.stories");
        let translated = dir.path().join("book.translated.stories");
        assert_eq!(
            fs::read_to_string(loaded.join("Story_ua.xml")).unwrap(),
            STORY_A
        );
        assert_eq!(
            fs::read_to_string(translated.join("Story_ub.xml")).unwrap(),
            STORY_B
        );
    }

    #[test]
    fn test_missing_archive_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = ZipIdmlRepository::new(false).load_stories(&dir.path().join("nope.idml"));
        assert!(matches!(result, Err(crate::error::Error::Io(_))));
    }
}
