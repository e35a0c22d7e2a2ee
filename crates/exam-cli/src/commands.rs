use std::path::Path;

use anyhow::{Context, Result};
use exam_cli::export::{export_arrays, write_array_csv};
use exam_cli::{
    AppliedOutput, DataTransformation, DataTransformationConfig, TransformationOutput,
    apply_preprocessor,
};
use exam_transform::{FittedColumnTransformer, load_preprocessor};
use tracing::info;

use crate::cli::{ApplyArgs, InspectArgs, TransformArgs};

pub fn run_transform(args: &TransformArgs) -> Result<TransformationOutput> {
    let config = DataTransformationConfig::default()
        .with_preprocessor_path(&args.artifact)
        .with_fit_policy(args.fit_policy.into());
    let output = DataTransformation::new(config)
        .initiate_data_transformation(&args.train, &args.test)
        .context("transform train/test tables")?;

    if let Some(dir) = &args.output_dir {
        export_arrays(&output, dir).with_context(|| format!("export arrays to {}", dir.display()))?;
        info!(dir = %dir.display(), "exported train and test arrays");
    }
    Ok(output)
}

pub fn run_apply(args: &ApplyArgs) -> Result<AppliedOutput> {
    let output = apply_preprocessor(&args.artifact, &args.data, args.target.as_deref())
        .with_context(|| format!("apply {}", args.artifact.display()))?;
    if let Some(path) = &args.output {
        export(path, &output.header, &output.array)?;
    }
    Ok(output)
}

pub fn run_inspect(args: &InspectArgs) -> Result<FittedColumnTransformer> {
    load_preprocessor(&args.artifact).with_context(|| format!("load {}", args.artifact.display()))
}

fn export(path: &Path, header: &[String], array: &ndarray::Array2<f64>) -> Result<()> {
    write_array_csv(path, header, array).with_context(|| format!("write {}", path.display()))
}
