#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::Path;

    const SRC: &str = "src";
    const UNIT: &str = "tests/unit";

    // Modules declared in `file` by lines of the form `<keyword> <name>;`
    fn declared_modules(file: &Path, keyword: &str) -> io::Result<BTreeSet<String>> {
        let content = fs::read_to_string(file)?;
        Ok(content
            .lines()
            .filter_map(|line| line.trim().strip_prefix(keyword))
            .filter_map(|rest| rest.trim().strip_suffix(';'))
            .map(str::to_string)
            .collect())
    }

    // Stems of the `.rs` files directly inside `dir`, without `mod.rs`
    fn module_files(dir: &Path) -> io::Result<BTreeSet<String>> {
        let mut stems = BTreeSet::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
                continue;
            }
            if let Some(stem) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .filter(|stem| *stem != "mod")
            {
                stems.insert(stem.to_string());
            }
        }
        Ok(stems)
    }

    fn library_areas() -> BTreeSet<String> {
        let areas = declared_modules(&Path::new(SRC).join("lib.rs"), "pub mod ")
            .expect("src/lib.rs is readable");
        assert!(!areas.is_empty(), "src/lib.rs declares no modules");
        areas
    }

    fn report(title: &str, problems: &[String]) {
        assert!(
            problems.is_empty(),
            "{title}:\n{}",
            problems
                .iter()
                .map(|problem| format!("  - {problem}"))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    // Tests every library module has a test area compiled by the unit root
    // Verified by dropping `mod worker;` from tests/unit/main.rs
    #[test]
    fn test_unit_root_declares_every_area() {
        let unit = Path::new(UNIT);
        let declared = declared_modules(&unit.join("main.rs"), "mod ")
            .expect("tests/unit/main.rs is readable");
        let mut problems = Vec::new();

        for area in library_areas() {
            if !declared.contains(&area) {
                problems.push(format!("tests/unit/main.rs does not declare `mod {area};`"));
            }
            if !unit.join(&area).join("mod.rs").is_file() {
                problems.push(format!("tests/unit/{area}/mod.rs is missing"));
            }
        }

        report("Unit test areas not compiled", &problems);
    }

    // Tests each source file has a declared test file and each test file a source
    // Verified by adding an undeclared file under tests/unit/engine
    #[test]
    fn test_source_files_are_mirrored() {
        let mut problems = Vec::new();

        for area in library_areas() {
            let src_dir = Path::new(SRC).join(&area);
            let test_dir = Path::new(UNIT).join(&area);
            let sources = module_files(&src_dir).unwrap_or_default();
            let tests = module_files(&test_dir).unwrap_or_default();
            let declared =
                declared_modules(&test_dir.join("mod.rs"), "pub mod ").unwrap_or_default();

            for missing in sources.difference(&tests) {
                problems.push(format!(
                    "src/{area}/{missing}.rs has no tests/unit/{area}/{missing}.rs"
                ));
            }
            for orphan in tests.difference(&sources) {
                problems.push(format!(
                    "tests/unit/{area}/{orphan}.rs has no src/{area}/{orphan}.rs"
                ));
            }
            for undeclared in tests.difference(&declared) {
                problems.push(format!(
                    "tests/unit/{area}/mod.rs does not declare `pub mod {undeclared};`"
                ));
            }
        }

        report("Unit test tree out of step with src", &problems);
    }

    // Tests every mirrored test file and integration test holds a test
    // Verified by emptying tests/unit/io/progress.rs
    #[test]
    fn test_test_files_contain_tests() {
        let mut files = Vec::new();
        for area in library_areas() {
            let dir = Path::new(UNIT).join(&area);
            for stem in module_files(&dir).unwrap_or_default() {
                files.push(dir.join(format!("{stem}.rs")));
            }
        }
        for stem in module_files(Path::new("tests")).expect("tests is readable") {
            files.push(Path::new("tests").join(format!("{stem}.rs")));
        }

        let problems: Vec<String> = files
            .iter()
            .filter(|path| {
                !fs::read_to_string(path).is_ok_and(|content| content.contains("#[test]"))
            })
            .map(|path| path.display().to_string())
            .collect();

        report("Test files without a #[test] function", &problems);
    }
}
