#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use locstat::{ExtractConfig, PipelineConfig};
use zip::write::SimpleFileOptions;

/// Build an in-memory zip. Names ending in `/` become directory records.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buf);
        for (name, data) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .expect("add directory");
            } else {
                writer
                    .start_file(*name, SimpleFileOptions::default())
                    .expect("start entry");
                writer.write_all(data).expect("write entry");
            }
        }
        writer.finish().expect("finish zip");
    }
    buf.into_inner()
}

/// Pipeline configuration whose workspaces live under `parent`.
pub fn config_under(parent: &Path) -> PipelineConfig {
    PipelineConfig {
        extract: ExtractConfig::default().with_workspace_parent(parent),
        ..Default::default()
    }
}

pub fn leftover_entries(parent: &Path) -> usize {
    fs::read_dir(parent).expect("read parent").count()
}
