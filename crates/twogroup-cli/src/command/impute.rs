use std::path::PathBuf;

use clap::Args;

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct ImputeArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Output file path for the filled dataset (stdout if omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ImputeArg) -> anyhow::Result<()> {
    let dataset = util::read_dataset_file(&arg.dataset)?;
    let missing = dataset.missing_counts();
    for ((parameter, category), count) in &missing {
        tracing::info!(parameter, category, count, "filling missing values with the group median");
    }
    if missing.is_empty() {
        tracing::info!("dataset has no missing values");
    }

    let filled = dataset.median_filled()?;
    Output::save_json(&filled, arg.output.clone())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use twogroup_analysis::dataset::{Dataset, Observation};

    use super::*;

    #[test]
    fn test_run_writes_filled_dataset() {
        let dir = env::temp_dir().join(format!("twogroup-cli-impute-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let dataset_path = dir.join("dataset.json");
        let output_path = dir.join("filled.json");
        let dataset = Dataset::new(vec![
            Observation::new(Some(1.0), "weight", "healthy"),
            Observation::new(None, "weight", "healthy"),
            Observation::new(Some(3.0), "weight", "healthy"),
            Observation::new(Some(10.0), "weight", "diseased"),
            Observation::new(None, "weight", "diseased"),
            Observation::new(Some(20.0), "weight", "diseased"),
            Observation::new(Some(30.0), "weight", "diseased"),
        ]);
        Output::save_json(&dataset, Some(dataset_path.clone())).unwrap();

        let arg = ImputeArg {
            dataset: dataset_path,
            output: Some(output_path.clone()),
        };
        run(&arg).unwrap();

        let filled = util::read_dataset_file(&output_path).unwrap();
        assert!(filled.missing_counts().is_empty());
        assert_eq!(filled.observations.len(), dataset.observations.len());
        assert_eq!(filled.sample("weight", "healthy"), vec![1.0, 2.0, 3.0]);
        assert_eq!(filled.sample("weight", "diseased"), vec![10.0, 20.0, 20.0, 30.0]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_run_fails_for_group_without_values() {
        let dir = env::temp_dir().join(format!("twogroup-cli-impute-empty-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let dataset_path = dir.join("dataset.json");
        let output_path = dir.join("filled.json");
        let dataset = Dataset::new(vec![
            Observation::new(Some(1.0), "weight", "healthy"),
            Observation::new(None, "weight", "diseased"),
        ]);
        Output::save_json(&dataset, Some(dataset_path.clone())).unwrap();

        let arg = ImputeArg {
            dataset: dataset_path,
            output: Some(output_path.clone()),
        };
        let err = run(&arg).unwrap_err();
        assert!(err.to_string().contains("'weight'"));
        assert!(!output_path.exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
