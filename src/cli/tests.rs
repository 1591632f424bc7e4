use super::*;

#[test]
fn test_walkdir_collects_nested_files() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("inner");
    std::fs::create_dir(&nested).unwrap();
    std::fs::write(dir.path().join("a.vo"), "package demo\n").unwrap();
    std::fs::write(nested.join("b.vo"), "package inner\n").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not source").unwrap();

    let files = walkdir(dir.path()).unwrap();
    let vo_files: Vec<_> = files
        .iter()
        .filter(|p| p.extension().is_some_and(|e| e == "vo"))
        .collect();
    assert_eq!(vo_files.len(), 2);
}

#[test]
fn test_cli_parses_check_command() {
    let cli = Cli::try_parse_from(["vouch", "check", "src", "--facts", "facts.json"]).unwrap();
    match cli.command {
        Command::Check { paths, facts } => {
            assert_eq!(paths, vec![PathBuf::from("src")]);
            assert_eq!(facts, Some(PathBuf::from("facts.json")));
        }
        _ => panic!("expected check command"),
    }
}

#[test]
fn test_cli_parses_facts_command() {
    let cli = Cli::try_parse_from(["vouch", "--json", "facts", "facts.json"]).unwrap();
    assert!(cli.json);
    assert!(matches!(cli.command, Command::Facts { .. }));
}
