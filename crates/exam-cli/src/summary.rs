use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use exam_cli::inspect::input_columns;
use exam_cli::{AppliedOutput, TransformationOutput};
use exam_model::FeatureSchema;
use exam_transform::{
    FillValue, FittedColumnTransformer, FittedOneHotEncoder, FittedSimpleImputer,
    FittedStandardScaler, FittedStep,
};

pub fn print_transform_summary(output: &TransformationOutput) {
    println!("Fit policy: {}", output.fit_policy);
    println!("Preprocessor: {}", output.preprocessor_path.display());
    println!("SHA-256: {}", output.artifact.sha256);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Features"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for (name, array) in [("train", &output.train_array), ("test", &output.test_array)] {
        table.add_row(vec![
            Cell::new(name).fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(array.nrows()),
            Cell::new(array.ncols().saturating_sub(1)),
            Cell::new(array.ncols()),
        ]);
    }
    println!("{table}");
    println!(
        "Artifact: {} bytes, {} output features + target '{}'",
        output.artifact.bytes,
        output.feature_names.len(),
        output.target
    );
}

pub fn print_apply_summary(output: &AppliedOutput) {
    println!(
        "Transformed {} rows into {} columns",
        output.array.nrows(),
        output.array.ncols()
    );
    if let Some(last) = output.header.last()
        && output.header.len() > output.preprocessor.n_features_out()
    {
        println!("Target: {last}");
    }
}

pub fn print_inspect(preprocessor: &FittedColumnTransformer) {
    let mut inputs = Table::new();
    inputs.set_header(vec![
        header_cell("Branch"),
        header_cell("Column"),
        header_cell("Role"),
        header_cell("Fill value"),
        header_cell("Categories"),
    ]);
    apply_table_style(&mut inputs);

    let mut outputs = Table::new();
    outputs.set_header(vec![header_cell("#"), header_cell("Feature"), header_cell("Scale")]);
    apply_table_style(&mut outputs);
    align_column(&mut outputs, 0, CellAlignment::Right);
    align_column(&mut outputs, 2, CellAlignment::Right);

    let schema = FeatureSchema::student_performance();
    let mut roles = input_columns(preprocessor, &schema).into_iter().map(|input| input.role);
    let mut index = 0usize;
    for branch in preprocessor.branches() {
        let parts = BranchParts::of(branch.pipeline.steps().iter().map(|s| &s.step));
        for (i, column) in branch.columns.iter().enumerate() {
            let fill = parts
                .imputer
                .and_then(|imputer| imputer.statistics().get(i))
                .map_or_else(|| dim_cell("-"), |value| Cell::new(fill_label(value)));
            let categories = parts
                .encoder
                .and_then(|encoder| encoder.categories().get(i))
                .map_or_else(|| dim_cell("-"), |cats| Cell::new(cats.join(", ")));
            let role = roles
                .next()
                .flatten()
                .map_or_else(|| dim_cell("-"), Cell::new);
            inputs.add_row(vec![
                Cell::new(&branch.name).fg(Color::Blue),
                Cell::new(column),
                role,
                fill,
                categories,
            ]);
        }
        for (i, feature) in branch.pipeline.feature_names_out().into_iter().enumerate() {
            let scale = parts
                .scaler
                .and_then(|scaler| scaler.scale().get(i))
                .map_or_else(|| dim_cell("-"), |s| Cell::new(format!("{s:.4}")));
            outputs.add_row(vec![
                dim_cell(index),
                Cell::new(format!("{}__{feature}", branch.name)),
                scale,
            ]);
            index += 1;
        }
    }
    println!("Inputs:");
    println!("{inputs}");
    println!();
    println!("Outputs:");
    println!("{outputs}");
}

/// The fitted transformers of one branch, last of each kind.
#[derive(Default)]
struct BranchParts<'a> {
    imputer: Option<&'a FittedSimpleImputer>,
    encoder: Option<&'a FittedOneHotEncoder>,
    scaler: Option<&'a FittedStandardScaler>,
}

impl<'a> BranchParts<'a> {
    fn of(steps: impl Iterator<Item = &'a FittedStep>) -> Self {
        let mut parts = Self::default();
        for step in steps {
            match step {
                FittedStep::Impute(imputer) => parts.imputer = Some(imputer),
                FittedStep::OneHotEncode(encoder) => parts.encoder = Some(encoder),
                FittedStep::Scale(scaler) => parts.scaler = Some(scaler),
            }
        }
        parts
    }
}

fn fill_label(value: &FillValue) -> String {
    match value {
        FillValue::Number(n) => format!("{n}"),
        FillValue::Text(text) => text.clone(),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
