//! Application icon lookup keyed by window class.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Read-only registry of application icons.
pub trait IconRegistry {
    /// Icon name declared by the desktop entry `<desktop_id>.desktop`.
    fn desktop_icon(&self, desktop_id: &str) -> Option<String>;
    /// Whether an icon theme ships an icon called `name`.
    fn theme_icon(&self, name: &str) -> bool;
}

/// Outcome of resolving a class. Misses are cached like hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconLookup {
    Found(String),
    NotFound,
}

impl IconLookup {
    pub fn name(&self) -> Option<&str> {
        match self {
            IconLookup::Found(name) => Some(name),
            IconLookup::NotFound => None,
        }
    }
}

/// Memoizing resolver; each class costs at most one registry walk per
/// process lifetime.
pub struct IconResolver {
    registry: Box<dyn IconRegistry>,
    cache: HashMap<String, IconLookup>,
}

impl IconResolver {
    pub fn new(registry: Box<dyn IconRegistry>) -> Self {
        Self {
            registry,
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, class: &str) -> IconLookup {
        if class.is_empty() {
            return IconLookup::NotFound;
        }
        if let Some(hit) = self.cache.get(class) {
            return hit.clone();
        }
        let lookup = self.lookup_uncached(class);
        if lookup == IconLookup::NotFound {
            debug!("no icon for class {class}");
        }
        self.cache.insert(class.to_string(), lookup.clone());
        lookup
    }

    fn lookup_uncached(&self, class: &str) -> IconLookup {
        let lower = class.to_lowercase();
        for id in [class, lower.as_str()] {
            if let Some(name) = self.registry.desktop_icon(id) {
                return IconLookup::Found(name);
            }
        }
        let hyphenated = lower.split_whitespace().collect::<Vec<_>>().join("-");
        for name in [class, lower.as_str(), hyphenated.as_str()] {
            if !name.is_empty() && self.registry.theme_icon(name) {
                return IconLookup::Found(name.to_string());
            }
        }
        IconLookup::NotFound
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

/// Letter shown in place of a missing icon.
pub fn fallback_glyph(class: &str) -> char {
    class
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('?')
}

/// Desktop-entry and icon-theme lookup over the XDG data directories.
pub struct DesktopRegistry {
    data_dirs: Vec<PathBuf>,
}

impl DesktopRegistry {
    pub fn from_env() -> Self {
        let mut data_dirs = Vec::new();
        if let Some(user) = dirs::data_dir() {
            data_dirs.push(user);
        }
        let system = env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
        data_dirs.extend(
            system
                .split(':')
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        );
        Self::new(data_dirs)
    }

    pub fn new(data_dirs: Vec<PathBuf>) -> Self {
        Self { data_dirs }
    }

    fn theme_dirs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.data_dirs.iter().flat_map(|base| {
            let mut dirs = Vec::new();
            if let Ok(themes) = fs::read_dir(base.join("icons")) {
                for theme in themes.flatten() {
                    if let Ok(sizes) = fs::read_dir(theme.path()) {
                        dirs.extend(sizes.flatten().map(|size| size.path().join("apps")));
                    }
                }
            }
            dirs.push(base.join("pixmaps"));
            dirs
        })
    }
}

impl IconRegistry for DesktopRegistry {
    fn desktop_icon(&self, desktop_id: &str) -> Option<String> {
        let file_name = format!("{desktop_id}.desktop");
        self.data_dirs
            .iter()
            .map(|base| base.join("applications").join(&file_name))
            .find_map(|path| read_desktop_icon(&path))
    }

    fn theme_icon(&self, name: &str) -> bool {
        self.theme_dirs().any(|dir| {
            ["png", "svg", "xpm"]
                .iter()
                .any(|ext| dir.join(format!("{name}.{ext}")).is_file())
        })
    }
}

/// `Icon=` of the `[Desktop Entry]` group, if the file exists and has one.
fn read_desktop_icon(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let mut in_entry = false;
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_entry = line == "[Desktop Entry]";
            continue;
        }
        if in_entry
            && let Some(value) = line.strip_prefix("Icon=")
            && !value.trim().is_empty()
        {
            return Some(value.trim().to_string());
        }
    }
    None
}
