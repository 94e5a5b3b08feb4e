use tessera_core::{Error, PrefContainer};

fn sample() -> PrefContainer {
    let mut prefs = PrefContainer::new();
    prefs.set_value("WINDOW_TITLE", "Untitled").expect("title");
    prefs.set_value("WINDOW_WIDTH", 600).expect("width");
    prefs.set_value("WINDOW_FULLSCREEN", false).expect("fullscreen");
    prefs.set_value("MASTER_VOLUME", 0.75_f32).expect("volume");
    prefs.set_value("FONTS_DIR", "").expect("fonts");
    prefs
}

#[test]
fn saved_files_load_back_unchanged() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("settings.txt");
    let prefs = sample();

    prefs.save(&path).expect("save");
    let mut loaded = PrefContainer::new();
    loaded.load(&path).expect("load");

    assert_eq!(loaded, prefs);
}

#[test]
fn loading_merges_into_existing_entries() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("override.txt");
    std::fs::write(&path, "WINDOW_WIDTH:INT=1024\nEXTRA:UINT=3\n").expect("write");

    let mut prefs = sample();
    prefs.load(&path).expect("load");

    assert_eq!(prefs.value::<i64>("WINDOW_WIDTH"), Ok(1024));
    assert_eq!(prefs.value::<u64>("EXTRA"), Ok(3));
    assert_eq!(prefs.value::<String>("WINDOW_TITLE"), Ok("Untitled".to_owned()));
}

#[test]
fn missing_files_are_reported() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let mut prefs = PrefContainer::new();
    let result = prefs.load(dir.path().join("absent.txt"));
    assert!(matches!(result, Err(Error::FileNotFound { .. })));
    assert_eq!(prefs.count(), 0);
}

#[test]
fn malformed_files_leave_the_container_untouched() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("broken.txt");
    std::fs::write(&path, "WINDOW_WIDTH:INT=800\nWINDOW_HEIGHT=600\n").expect("write");

    let mut prefs = sample();
    let result = prefs.load(&path);

    assert!(matches!(result, Err(Error::InvalidParse { line: 2, .. })));
    assert_eq!(prefs.value::<i64>("WINDOW_WIDTH"), Ok(600));
}
