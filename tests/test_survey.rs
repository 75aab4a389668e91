use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use typthon_protocols::frontend::cli::{Cli, CliConfig};
use typthon_protocols::frontend::config::{Config, CONFIG_FILE_NAME};
use typthon_protocols::frontend::{collect_files, survey_files};
use typthon_protocols::{ProtocolStore, PythonVersion, TypeTag};

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pkg")).unwrap();
    fs::create_dir_all(dir.path().join("venv")).unwrap();

    fs::write(
        dir.path().join("pkg").join("loops.py"),
        concat!(
            "def run(items, handler):\n",
            "    for item in items:\n",
            "        handler(item, 1)\n",
            "    return next(items)\n",
        ),
    )
    .unwrap();
    fs::write(dir.path().join("pkg").join("calls.py"), "callback('a')\ncallback('b')\n").unwrap();
    fs::write(dir.path().join("venv").join("ignored.py"), "ignored()\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "not python").unwrap();
    dir
}

#[test]
fn test_collect_files_respects_excludes() {
    let dir = project();
    let config = Config::default();

    let mut files = collect_files(&config, &[dir.path().to_path_buf()]).unwrap();
    files.sort();

    let names: Vec<_> = files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["calls.py", "loops.py"]);
}

#[test]
fn test_collect_files_missing_path() {
    let config = Config::default();
    assert!(collect_files(&config, &[PathBuf::from("/definitely/not/here")]).is_err());
}

#[test]
fn test_survey_builds_composites() {
    let dir = project();
    let config = Config::default();
    let store = ProtocolStore::new();
    let file = dir.path().join("pkg").join("loops.py");

    let results = survey_files(&store, &config, &[file]);
    assert_eq!(results.len(), 1);
    let survey = results.into_iter().next().unwrap().unwrap();
    let report = survey.report(&store);

    let find = |name: &str| report.names.iter().find(|n| n.name == name).unwrap();

    let items = find("items");
    assert_eq!(items.rendered, "iterable, iterator");
    assert_eq!(items.type_tag, TypeTag::Unknown);
    assert_eq!(items.references.len(), 2);

    let handler = find("handler");
    assert_eq!(handler.rendered, "handler()");
    assert_eq!(handler.type_tag, TypeTag::Function);
    assert_eq!(handler.overloads.len(), 1);
    assert_eq!(handler.overloads[0].parameters.len(), 2);
    assert_eq!(handler.overloads[0].parameters[1].type_display, "int");
    assert_eq!(handler.references[0].line(), 3);
}

#[test]
fn test_parallel_and_serial_agree() {
    let dir = project();
    let files = collect_files(&Config::default(), &[dir.path().join("pkg")]).unwrap();

    let mut rendered = Vec::new();
    for parallel in [true, false] {
        let mut config = Config::default();
        config.analysis.parallel = parallel;
        let store = ProtocolStore::new();

        let mut reports: Vec<_> = survey_files(&store, &config, &files)
            .into_iter()
            .map(|r| r.unwrap().report(&store))
            .collect();
        reports.sort_by(|a, b| a.path.cmp(&b.path));
        rendered.push(serde_json::to_value(&reports).unwrap());
    }

    assert_eq!(rendered[0], rendered[1]);
}

#[test]
fn test_parse_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.py");
    fs::write(&broken, "def (:\n").unwrap();

    let store = ProtocolStore::new();
    let results = survey_files(&store, &Config::default(), &[broken]);
    let err = results.into_iter().next().unwrap().unwrap_err();
    assert!(err.contains("broken.py"));
}

#[test]
fn test_json_report_shape() {
    let dir = project();
    let store = ProtocolStore::new();
    let file = dir.path().join("pkg").join("calls.py");
    let survey = survey_files(&store, &Config::default(), &[file]).remove(0).unwrap();

    let json = serde_json::to_value(survey.report(&store)).unwrap();
    assert_eq!(json["module"], "calls");
    let callback = &json["names"][0];
    assert_eq!(callback["name"], "callback");
    assert_eq!(callback["rendered"], "callback()");
    assert_eq!(callback["fragments"][0]["kind"], "Name");
    assert_eq!(callback["fragments"][2]["kind"], "EndOfDeclaration");
    assert_eq!(callback["references"].as_array().unwrap().len(), 2);
}

#[test]
fn test_cli_uses_config_file_and_flags() {
    let dir = project();
    let config_path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(
        &config_path,
        "[analysis]\npython_version = \"2.7\"\n\n[output]\nshow_references = false\n",
    )
    .unwrap();

    let cli = Cli::new(CliConfig {
        paths: vec![dir.path().join("pkg")],
        config_file: Some(config_path.clone()),
        ..CliConfig::default()
    })
    .unwrap();
    assert_eq!(cli.config().analysis.python_version, PythonVersion::V2_7);
    assert!(!cli.config().output.show_references);

    let overridden = Cli::new(CliConfig {
        paths: vec![dir.path().join("pkg")],
        config_file: Some(config_path),
        python_version: Some(PythonVersion::new(3, 11)),
        ..CliConfig::default()
    })
    .unwrap();
    assert!(overridden.config().analysis.python_version.is_3x());
}

#[test]
fn test_text_report() {
    let dir = project();
    let cli = Cli::new(CliConfig {
        paths: vec![dir.path().join("pkg")],
        config_file: Some(dir.path().join("missing.toml")),
        ..CliConfig::default()
    });
    assert!(cli.is_err());

    let config_path = dir.path().join(CONFIG_FILE_NAME);
    Config::default().save(&config_path).unwrap();
    let cli = Cli::new(CliConfig {
        paths: vec![dir.path().join("pkg")],
        config_file: Some(config_path),
        ..CliConfig::default()
    })
    .unwrap();

    let store = ProtocolStore::new();
    let file = dir.path().join("pkg").join("calls.py");
    let report = survey_files(&store, cli.config(), &[file]).remove(0).unwrap().report(&store);
    let text = cli.render_text(&[report]);

    assert!(text.contains("  callback: callback()\n"));
    assert!(text.contains("calls.py:1:0"));
    assert!(text.contains("calls.py:2:0"));
}
