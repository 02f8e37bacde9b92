//! Per-model texture deduplication.
//!
//! Every texture file a model references is uploaded at most once; meshes
//! share the resulting [`TextureRecord`] by reference. The cache belongs to
//! one [`Model`](super::Model) and is dropped with it.

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use fxhash::FxHashMap;

use crate::abs::Texture;
use crate::import::TextureRole;

/// One loaded (or failed) texture, shared across every mesh that uses it.
///
/// The role tag is the role of the first request that loaded the record; a
/// later request for the same path under a different role reuses the record
/// as-is.
pub struct TextureRecord {
    /// `None` when decoding failed; the mesh draws without this texture.
    pub texture: Option<Texture>,
    pub role: TextureRole,
    /// Directory-qualified source path, also the cache key.
    pub path: String,
}

/// Maps a resolved texture path to its uploaded record.
#[derive(Default)]
pub struct TextureCache {
    records: FxHashMap<String, Rc<TextureRecord>>,
}

impl TextureCache {
    /// Returns the record for `path`, decoding and uploading it on the
    /// first request. A decode failure is logged and cached as a record
    /// without a texture, so a broken path is not retried per mesh.
    pub fn resolve(
        &mut self,
        gl: &Arc<glow::Context>,
        path: &str,
        role: TextureRole,
    ) -> Rc<TextureRecord> {
        self.resolve_with(path, role, |p| {
            match Texture::from_file(gl, Path::new(p), false) {
                Ok(texture) => Some(texture),
                Err(e) => {
                    log::error!("{e}");
                    None
                }
            }
        })
    }

    /// Cache lookup-or-insert with the actual load step injected; the GL
    /// upload path goes through [`TextureCache::resolve`].
    pub(crate) fn resolve_with(
        &mut self,
        path: &str,
        role: TextureRole,
        load: impl FnOnce(&str) -> Option<Texture>,
    ) -> Rc<TextureRecord> {
        if let Some(record) = self.records.get(path) {
            return Rc::clone(record);
        }

        let record = Rc::new(TextureRecord {
            texture: load(path),
            role,
            path: path.to_string(),
        });
        self.records.insert(path.to_string(), Rc::clone(&record));
        record
    }

    /// Number of unique texture paths seen so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_path_resolves_to_identical_record() {
        let mut cache = TextureCache::default();
        let mut loads = 0;
        let first = cache.resolve_with("dir/wall.png", TextureRole::Diffuse, |_| {
            loads += 1;
            None
        });
        let second = cache.resolve_with("dir/wall.png", TextureRole::Diffuse, |_| {
            loads += 1;
            None
        });
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(loads, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(first.role, TextureRole::Diffuse);
        assert_eq!(first.path, "dir/wall.png");
    }

    #[test]
    fn test_cached_record_keeps_first_role() {
        let mut cache = TextureCache::default();
        let first = cache.resolve_with("dir/map.png", TextureRole::Diffuse, |_| None);
        let again = cache.resolve_with("dir/map.png", TextureRole::Height, |_| None);
        assert!(Rc::ptr_eq(&first, &again));
        assert_eq!(again.role, TextureRole::Diffuse);
    }

    #[test]
    fn test_distinct_paths_get_distinct_records() {
        let mut cache = TextureCache::default();
        let a = cache.resolve_with("a.png", TextureRole::Specular, |_| None);
        let b = cache.resolve_with("b.png", TextureRole::Specular, |_| None);
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_load_is_cached_and_not_retried() {
        let mut cache = TextureCache::default();
        let mut loads = 0;
        let record = cache.resolve_with("missing.png", TextureRole::Normal, |_| {
            loads += 1;
            None
        });
        assert!(record.texture.is_none());
        let again = cache.resolve_with("missing.png", TextureRole::Normal, |_| {
            loads += 1;
            None
        });
        assert!(Rc::ptr_eq(&record, &again));
        assert_eq!(loads, 1);
    }
}
