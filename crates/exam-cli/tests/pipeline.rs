//! Integration tests for the data transformation operation.

use std::fs;
use std::path::{Path, PathBuf};

use exam_cli::export::export_arrays;
use exam_cli::inspect::input_columns;
use exam_cli::{
    DataTransformation, DataTransformationConfig, FitPolicy, StageCause, TransformStage,
    apply_preprocessor,
};
use exam_ingest::IngestError;
use exam_model::{ColumnRole, FeatureSchema};
use exam_transform::{TransformError, load_preprocessor};
use tempfile::TempDir;

const HEADER: &str = "gender,race_ethnicity,parental_level_of_education,lunch,test_preparation_course,math_score,reading_score,writing_score";

const TRAIN_ROWS: &str = "\
female,group B,bachelor's degree,standard,none,72,72,74
female,group C,some college,standard,completed,69,90,88
female,group B,master's degree,standard,none,90,95,93
male,group A,associate's degree,free/reduced,none,47,57,44
male,group C,some college,standard,none,76,78,75
female,group B,associate's degree,standard,none,71,83,78
female,group B,some college,standard,completed,88,95,92
male,group B,some college,free/reduced,none,40,43,39
male,group D,high school,free/reduced,completed,64,64,67
female,group B,high school,free/reduced,none,38,60,50
male,group C,associate's degree,standard,none,58,54,52
male,group D,associate's degree,standard,none,40,52,43
female,group B,high school,standard,none,65,81,73
male,group A,some college,standard,completed,78,72,70
female,group A,master's degree,standard,none,50,53,58
female,group C,some high school,standard,none,69,75,78
male,group C,high school,standard,none,88,89,86
female,group B,some high school,free/reduced,none,18,32,28
male,group C,master's degree,free/reduced,completed,46,42,46
female,group E,associate's degree,standard,none,70,70,65
";

const TEST_ROWS: &str = "\
female,group C,bachelor's degree,standard,none,62,70,75
male,group E,some college,free/reduced,completed,66,67,61
female,group D,high school,standard,none,79,89,86
male,group B,associate's degree,standard,completed,61,60,57
";

struct Fixture {
    dir: TempDir,
    train: PathBuf,
    test: PathBuf,
}

impl Fixture {
    fn new(train_rows: &str, test_rows: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let train = write_table(dir.path(), "train.csv", HEADER, train_rows);
        let test = write_table(dir.path(), "test.csv", HEADER, test_rows);
        Self { dir, train, test }
    }

    fn artifact(&self) -> PathBuf {
        self.dir.path().join("artifacts").join("preprocessor.json")
    }

    fn operation(&self, policy: FitPolicy) -> DataTransformation {
        DataTransformation::new(
            DataTransformationConfig::default()
                .with_preprocessor_path(self.artifact())
                .with_fit_policy(policy),
        )
    }
}

fn write_table(dir: &Path, name: &str, header: &str, rows: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("{header}\n{rows}")).unwrap();
    path
}

#[test]
fn test_arrays_have_features_plus_target() {
    let fixture = Fixture::new(TRAIN_ROWS, TEST_ROWS);

    let output = fixture
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    assert_eq!(output.train_array.shape(), &[20, 20]);
    assert_eq!(output.test_array.shape(), &[4, 20]);
    assert_eq!(output.feature_names.len(), 19);
    assert_eq!(output.train_header().last().map(String::as_str), Some("math_score"));
    assert_eq!(output.test_header(), output.train_header());
    // Target values are carried through unscaled.
    assert_eq!(output.train_array[[0, 19]], 72.0);
    assert_eq!(output.test_array[[3, 19]], 61.0);
}

#[test]
fn test_artifact_is_written_and_reloadable() {
    let fixture = Fixture::new(TRAIN_ROWS, TEST_ROWS);

    let output = fixture
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    assert_eq!(output.preprocessor_path, fixture.artifact());
    assert!(fs::metadata(fixture.artifact()).unwrap().len() > 0);
    assert_eq!(output.artifact.sha256.len(), 64);

    let applied = apply_preprocessor(&fixture.artifact(), &fixture.test, Some("math_score")).unwrap();
    assert_eq!(applied.array, output.test_array);
    assert_eq!(applied.header, output.test_header());
}

#[test]
fn test_artifact_transforms_features_without_target() {
    let fixture = Fixture::new(TRAIN_ROWS, TEST_ROWS);
    fixture
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    let applied = apply_preprocessor(&fixture.artifact(), &fixture.test, None).unwrap();
    assert_eq!(applied.array.shape(), &[4, 19]);
    assert_eq!(applied.header.len(), 19);
}

#[test]
fn test_missing_column_in_test_table_fails() {
    let fixture = Fixture::new(TRAIN_ROWS, TEST_ROWS);
    let test = write_table(
        fixture.dir.path(),
        "test_no_lunch.csv",
        "gender,race_ethnicity,parental_level_of_education,test_preparation_course,math_score,reading_score,writing_score",
        "female,group C,bachelor's degree,none,62,70,75\n",
    );

    let err = fixture
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&fixture.train, &test)
        .unwrap_err();

    assert_eq!(err.stage, TransformStage::ReadInput);
    assert!(matches!(
        err.source,
        StageCause::Ingest(IngestError::MissingColumns { ref columns, .. }) if columns == &["lunch"]
    ));
    assert!(!fixture.artifact().exists());
}

#[test]
fn test_all_missing_numeric_column_is_imputed() {
    let train_rows: String = TRAIN_ROWS
        .lines()
        .map(|line| {
            let mut fields: Vec<&str> = line.split(',').collect();
            fields[6] = "";
            format!("{}\n", fields.join(","))
        })
        .collect();
    let fixture = Fixture::new(&train_rows, TEST_ROWS);

    let output = fixture
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    assert_eq!(output.train_array.shape(), &[20, 20]);
    // Median of no observations is 0.0 and a constant column keeps scale 1.0.
    assert!(output.train_array.column(0).iter().all(|v| *v == 0.0));
}

#[test]
fn test_all_missing_categorical_column_is_imputed() {
    let train_rows: String = TRAIN_ROWS
        .lines()
        .map(|line| {
            let mut fields: Vec<&str> = line.split(',').collect();
            fields[3] = "";
            format!("{}\n", fields.join(","))
        })
        .collect();
    let fixture = Fixture::new(&train_rows, TEST_ROWS);

    let output = fixture
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    assert!(
        output
            .feature_names
            .contains(&"cat_pipeline__lunch_missing_value".to_string())
    );
    // lunch collapses to one indicator, so one feature fewer than usual.
    assert_eq!(output.train_array.ncols(), 19);
    assert_eq!(output.test_array.ncols(), 19);
}

#[test]
fn test_rerun_is_deterministic() {
    let fixture = Fixture::new(TRAIN_ROWS, TEST_ROWS);
    let operation = fixture.operation(FitPolicy::TrainOnly);

    let first = operation
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();
    let second = operation
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    assert_eq!(first.train_array, second.train_array);
    assert_eq!(first.test_array, second.test_array);
    assert_eq!(first.artifact.sha256, second.artifact.sha256);
}

#[test]
fn test_refit_on_test_persists_training_fit() {
    let fixture = Fixture::new(TRAIN_ROWS, TRAIN_ROWS);

    let train_only = fixture
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();
    let saved_train_only = load_preprocessor(&fixture.artifact()).unwrap();

    let refit = fixture
        .operation(FitPolicy::RefitOnTest)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();
    let saved_refit = load_preprocessor(&fixture.artifact()).unwrap();

    // Identical tables: refitting on "test" reproduces the training fit.
    assert_eq!(refit.test_array, train_only.test_array);
    assert_eq!(saved_refit, saved_train_only);
}

#[test]
fn test_refit_on_test_uses_test_statistics() {
    let fixture = Fixture::new(TRAIN_ROWS, TEST_ROWS);

    let train_only = fixture
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();
    let refit = fixture
        .operation(FitPolicy::RefitOnTest)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    assert_eq!(refit.train_array, train_only.train_array);
    assert_ne!(refit.test_array.column(0), train_only.test_array.column(0));
}

#[test]
fn test_missing_target_value_fails_at_append() {
    let test_rows = "female,group C,bachelor's degree,standard,none,,70,75\n";
    let fixture = Fixture::new(TRAIN_ROWS, test_rows);

    let err = fixture
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap_err();

    assert_eq!(err.stage, TransformStage::AppendTarget);
    assert!(matches!(
        err.source,
        StageCause::Transform(TransformError::MissingValues { .. })
    ));
    assert!(err.to_string().contains("append target column"));
}

#[test]
fn test_train_header_lists_features_then_target() {
    let fixture = Fixture::new(TRAIN_ROWS, TEST_ROWS);

    let output = fixture
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    insta::assert_json_snapshot!(output.train_header(), @r#"
    [
      "num_pipeline__reading_score",
      "num_pipeline__writing_score",
      "cat_pipeline__gender_female",
      "cat_pipeline__gender_male",
      "cat_pipeline__race_ethnicity_group A",
      "cat_pipeline__race_ethnicity_group B",
      "cat_pipeline__race_ethnicity_group C",
      "cat_pipeline__race_ethnicity_group D",
      "cat_pipeline__race_ethnicity_group E",
      "cat_pipeline__parental_level_of_education_associate's degree",
      "cat_pipeline__parental_level_of_education_bachelor's degree",
      "cat_pipeline__parental_level_of_education_high school",
      "cat_pipeline__parental_level_of_education_master's degree",
      "cat_pipeline__parental_level_of_education_some college",
      "cat_pipeline__parental_level_of_education_some high school",
      "cat_pipeline__lunch_free/reduced",
      "cat_pipeline__lunch_standard",
      "cat_pipeline__test_preparation_course_completed",
      "cat_pipeline__test_preparation_course_none",
      "math_score"
    ]
    "#);
}

#[test]
fn test_refit_on_test_exports_each_array_with_its_own_header() {
    // The test table lacks group A and two education levels seen in training.
    let fixture = Fixture::new(TRAIN_ROWS, TEST_ROWS);
    let output = fixture
        .operation(FitPolicy::RefitOnTest)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();
    assert_eq!(output.train_array.ncols(), 20);
    assert_eq!(output.test_array.ncols(), 17);
    assert_eq!(output.test_header().len(), 17);
    assert!(
        !output
            .test_header()
            .contains(&"cat_pipeline__race_ethnicity_group A".to_string())
    );

    let out_dir = fixture.dir.path().join("arrays");
    let (train_csv, test_csv) = export_arrays(&output, &out_dir).unwrap();

    for (path, width, rows) in [(&train_csv, 20, 20), (&test_csv, 17, 4)] {
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), rows + 1);
        assert!(lines.iter().all(|line| line.split(',').count() == width));
    }
    let test_text = fs::read_to_string(&test_csv).unwrap();
    let test_header = test_text.lines().next().unwrap();
    assert!(test_header.contains("cat_pipeline__race_ethnicity_group E"));
    assert!(test_header.ends_with("math_score"));
}

#[test]
fn test_export_rejects_mismatched_header_before_writing() {
    let fixture = Fixture::new(TRAIN_ROWS, TEST_ROWS);
    let mut output = fixture
        .operation(FitPolicy::RefitOnTest)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();
    output.test_feature_names = output.feature_names.clone();

    let out_dir = fixture.dir.path().join("arrays");
    assert!(export_arrays(&output, &out_dir).is_err());
    assert!(!out_dir.join("train_array.csv").exists());
}

#[test]
fn test_persisted_inputs_are_labeled_with_schema_roles() {
    let fixture = Fixture::new(TRAIN_ROWS, TEST_ROWS);
    fixture
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();
    let preprocessor = load_preprocessor(&fixture.artifact()).unwrap();

    let inputs = input_columns(&preprocessor, &FeatureSchema::student_performance());

    assert_eq!(inputs.len(), 7);
    assert!(inputs.iter().all(|input| input.role.is_some()));
    assert!(inputs.iter().all(|input| input.role != Some(ColumnRole::Target)));
    let numeric: Vec<&str> = inputs
        .iter()
        .filter(|input| input.role == Some(ColumnRole::Numerical))
        .map(|input| input.branch.as_str())
        .collect();
    assert_eq!(numeric, ["num_pipeline", "num_pipeline"]);
    let lunch = inputs.iter().find(|input| input.column == "lunch").unwrap();
    assert_eq!(lunch.branch, "cat_pipeline");
    assert_eq!(lunch.role.map(|r| r.to_string()).as_deref(), Some("categorical"));
}

#[test]
fn test_null_tokens_are_imputed_like_empty_fields() {
    // One missing reading score and one missing race/ethnicity.
    let first = "female,group B,bachelor's degree,standard,none,72,72,74";
    let fifth = "male,group C,some college,standard,none,76,78,75";
    let missing = |score: &str, group: &str| {
        TRAIN_ROWS
            .replacen(first, &format!("female,group B,bachelor's degree,standard,none,72,{score},74"), 1)
            .replacen(fifth, &format!("male,{group},some college,standard,none,76,78,75"), 1)
    };
    let train_rows = missing("NA", "NaN");
    let blank_rows = missing("", "");
    let with_tokens = Fixture::new(&train_rows, TEST_ROWS);
    let with_blanks = Fixture::new(&blank_rows, TEST_ROWS);

    let tokens = with_tokens
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&with_tokens.train, &with_tokens.test)
        .unwrap();
    let blanks = with_blanks
        .operation(FitPolicy::TrainOnly)
        .initiate_data_transformation(&with_blanks.train, &with_blanks.test)
        .unwrap();

    assert_eq!(tokens.feature_names, blanks.feature_names);
    assert_eq!(tokens.train_array, blanks.train_array);
    assert!(tokens.train_array.iter().all(|v| v.is_finite()));
}
