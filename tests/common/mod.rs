//! Shared fixtures: a temporary data directory with one FASTA file per
//! population and a configuration pointing at it.

#![allow(dead_code)]

use protloc::Config;
use std::path::Path;
use tempfile::TempDir;

pub const CYTO: &str = ">cyto1 cytoplasmic
MKKLLPTAAAGLLLLAAQPAMAMDIGINSDPNSSKRRVLLAGE
>cyto2
MSTNPKPQRKTKRNTNRRPQDVKFPGGGQIVGGVY
LLPRRGPRLGVRATRKTSERSQPRGRRQPIPK
";

pub const MITO: &str = ">mito1
MLSRAVCGTSRQLAPVLGYLGSRQKHSLPDLPYDYGALEPHINAQIMQLHHSKHHAAYVNNLNVTEEKYQEALAKGDVTAQ
IALQPALKFNGGGHINHSIFWTNLSPNGGGEPKGELLEAIKRDFGSFDKFKEKLTAASVGVQGSGWGWLGFNKERGHLQIAA
>mito2
MKWV
";

/// The second record starts with `X`, which the descriptors read as `M`
pub const BLIND: &str = ">SEQ677
MAKEGGTPLLAVHDGRPWGLRLWSASLGEHLCSQ
>SEQ231
XDLSALRVEEVQNVINAMQKILECPICLELIKEPVSTKCDHIFCKFCMLKLLNQKKGPSQCPLCKNDITKRSLQESTRFSQ
";

pub const CLASSES: [&str; 2] = ["cyto", "mito"];

/// Temporary data directory holding `cyto`, `mito` and `blind` populations
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        Self::with_files(&[("cyto", CYTO), ("mito", MITO), ("blind", BLIND)])
    }

    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for (name, contents) in files {
            write_fasta(dir.path(), name, contents);
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Default configuration restricted to the fixture classes
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.data.data_dir = self.path().to_path_buf();
        config.data.classes = CLASSES.iter().map(|c| c.to_string()).collect();
        config.encoding.pad_length = 100;
        config.performance.threads = 2;
        config
    }
}

pub fn write_fasta(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(format!("{}.fasta", name)), contents)
        .expect("Failed to write FASTA fixture");
}
