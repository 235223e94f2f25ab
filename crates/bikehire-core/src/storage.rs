use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::io::parquet::write::{ParquetCompression, ParquetWriter, StatisticsOptions};
use polars::prelude::{DataFrame, ParquetReader, SerReader};

use crate::error::{PipelineError, Result};

const PART_FILE_NAME: &str = "part-0.parquet";

/// Write a dataset as a single parquet file under `dest`, replacing whatever
/// the previous run left there.
pub fn write_parquet(df: &DataFrame, dest: &Path) -> Result<()> {
    replace_dir(dest)?;
    write_part_file(df.clone(), &dest.join(PART_FILE_NAME))
}

/// Write a dataset split into `<col>=<value>` directories per distinct
/// combination of the partition columns, replacing the previous contents of
/// `dest`. The partition columns themselves are removed from the row data;
/// their values live only in the directory names. Partition keys are expected
/// to be numeric (year/month derivations).
pub fn write_partitioned(df: &DataFrame, dest: &Path, partition_cols: &[&str]) -> Result<()> {
    replace_dir(dest)?;

    for part in df.partition_by(partition_cols.iter().copied(), true)? {
        let mut dir = dest.to_path_buf();
        for name in partition_cols {
            let value = part.column(name)?.get(0)?;
            dir.push(format!("{}={}", name, value));
        }
        fs::create_dir_all(&dir)?;

        let mut data = part;
        for name in partition_cols {
            data = data.drop(name)?;
        }
        write_part_file(data, &dir.join(PART_FILE_NAME))?;
    }

    Ok(())
}

/// Read every parquet file under `dir` (recursively) back into a single
/// dataset. Files are visited in path order.
pub fn read_parquet_dir(dir: &Path) -> Result<DataFrame> {
    let mut files = Vec::new();
    collect_parquet_files(dir, &mut files)?;
    files.sort();

    if files.is_empty() {
        return Err(PipelineError::Processing(format!(
            "no parquet data found under {}",
            dir.display()
        )));
    }

    let mut combined = read_parquet_file(&files[0])?;
    for path in &files[1..] {
        combined.vstack_mut(&read_parquet_file(path)?)?;
    }
    Ok(combined)
}

fn read_parquet_file(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    Ok(ParquetReader::new(file).finish()?)
}

fn write_part_file(mut df: DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Zstd(None))
        .with_statistics(StatisticsOptions::default())
        .finish(&mut df)?;
    Ok(())
}

fn replace_dir(dest: &Path) -> Result<()> {
    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    fs::create_dir_all(dest)?;
    Ok(())
}

fn collect_parquet_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_parquet_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "parquet") {
            files.push(path);
        }
    }
    Ok(())
}
