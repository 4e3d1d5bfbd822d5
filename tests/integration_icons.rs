use std::fs;
use std::path::Path;

use hypr_switcher::icons::{DesktopRegistry, IconLookup, IconRegistry, IconResolver};

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn data_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write(
        &base.join("applications/firefox.desktop"),
        "[Desktop Entry]\nName=Firefox\nIcon=firefox-esr\n\n[Desktop Action new]\nIcon=other\n",
    );
    write(
        &base.join("applications/broken.desktop"),
        "[Desktop Action x]\nIcon=wrong-group\n",
    );
    write(&base.join("icons/hicolor/48x48/apps/visual-studio-code.svg"), "<svg/>");
    write(&base.join("pixmaps/xterm.xpm"), "/* XPM */");
    dir
}

#[test]
fn desktop_entries_are_read_from_the_entry_group() {
    let dir = data_dir();
    let registry = DesktopRegistry::new(vec![dir.path().to_path_buf()]);
    assert_eq!(registry.desktop_icon("firefox"), Some("firefox-esr".into()));
    assert_eq!(registry.desktop_icon("broken"), None);
    assert_eq!(registry.desktop_icon("missing"), None);
}

#[test]
fn theme_and_pixmap_lookup() {
    let dir = data_dir();
    let registry = DesktopRegistry::new(vec![dir.path().to_path_buf()]);
    assert!(registry.theme_icon("visual-studio-code"));
    assert!(registry.theme_icon("xterm"));
    assert!(!registry.theme_icon("gimp"));
}

#[test]
fn resolution_order_over_a_real_tree() {
    let dir = data_dir();
    let mut resolver = IconResolver::new(Box::new(DesktopRegistry::new(vec![
        dir.path().to_path_buf(),
    ])));
    assert_eq!(
        resolver.resolve("Firefox"),
        IconLookup::Found("firefox-esr".into())
    );
    assert_eq!(
        resolver.resolve("Visual Studio Code"),
        IconLookup::Found("visual-studio-code".into())
    );
    assert_eq!(resolver.resolve("XTerm"), IconLookup::Found("xterm".into()));
    assert_eq!(resolver.resolve("Nonexistent"), IconLookup::NotFound);
    assert_eq!(resolver.cached_len(), 4);

    // Misses stay cached even once the icon shows up.
    write(&dir.path().join("pixmaps/nonexistent.png"), "png");
    assert_eq!(resolver.resolve("Nonexistent"), IconLookup::NotFound);
}
