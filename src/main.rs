use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use hutree_data::{Dataset, SyntheticShapes, render_scene};
use hutree_image::{BinaryMask, equalize, threshold};
use hutree_moments::{
    AxisSegment, BoundingBox, FeatureVector, HuVector, MomentSet, ShapeKind, Template,
    TemplateMatch, TemplateMatcher, extract_features, hu_moments, principal_axis, size_area,
};
use hutree_rf::{
    ClassMetrics, ConfusionMatrix, CrossValidation, DecisionTreeConfig, Estimator,
    RandomForestConfig, RankedFeature,
};

#[derive(Parser)]
#[command(name = "hutree")]
#[command(about = "Hu-moment shape descriptors with decision-tree and random-forest classification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for dataset generation, bootstraps and fold shuffles
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

/// Synthetic training set parameters.
#[derive(Args, Debug, Clone)]
struct DatasetArgs {
    /// Samples generated per shape class
    #[arg(long, default_value_t = 25)]
    per_class: usize,

    /// Side length of the synthetic canvas in pixels
    #[arg(long, default_value_t = 200)]
    canvas: usize,
}

/// Shared model hyperparameters.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Maximum tree depth; 0 makes every tree a single majority leaf
    #[arg(long, default_value_t = 10, conflicts_with = "unlimited_depth")]
    max_depth: usize,

    /// Grow trees without a depth cap
    #[arg(long)]
    unlimited_depth: bool,

    /// Minimum samples a node needs before it may split
    #[arg(long, default_value_t = 2)]
    min_samples_split: usize,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = 50)]
    n_trees: usize,

    /// Bootstrap size as a fraction of the training set, in (0, 1]
    #[arg(long, default_value_t = 0.8)]
    sample_ratio: f64,
}

impl ModelArgs {
    fn depth_cap(&self) -> Option<usize> {
        (!self.unlimited_depth).then_some(self.max_depth)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Render a shape, extract its descriptors and classify it
    Analyze {
        /// Shape to render: circle, square, rectangle or triangle
        #[arg(long, default_value = "circle")]
        shape: String,

        /// Scene side length in pixels
        #[arg(long, default_value_t = 200)]
        size: usize,

        /// Binarization threshold applied after equalization
        #[arg(long, default_value_t = 128)]
        threshold: u8,

        /// Shape intensity in the rendered scene
        #[arg(long, default_value_t = 200)]
        foreground: u8,

        /// Background intensity in the rendered scene
        #[arg(long, default_value_t = 40)]
        background: u8,

        /// Also measure the inverted mask (background as object)
        #[arg(long, default_value_t = false)]
        dual: bool,

        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Cross-validate a classifier on the synthetic shape dataset
    CrossValidate {
        /// Classifier to evaluate: "tree" or "forest"
        #[arg(long, default_value = "forest")]
        model: String,

        /// Number of folds
        #[arg(long, default_value_t = 5)]
        k: usize,

        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        params: ModelArgs,
    },

    /// Print the reference template feature vectors
    Templates {
        /// Canvas side length the templates are rasterized on
        #[arg(long, default_value_t = hutree_moments::DEFAULT_RESOLUTION)]
        resolution: usize,
    },
}

#[derive(Clone, Copy, Debug)]
enum ModelKind {
    Tree,
    Forest,
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct MomentEntry {
    p: usize,
    q: usize,
    value: f64,
}

#[derive(Serialize)]
struct Measurement {
    area: usize,
    centroid: (f64, f64),
    bounding_box: Option<BoundingBox>,
    principal_axis: AxisSegment,
    raw_moments: Vec<MomentEntry>,
    central_moments: Vec<MomentEntry>,
    hu: HuVector,
    features: FeatureVector,
    template: TemplateMatch,
}

#[derive(Serialize)]
struct ModelPrediction {
    label: String,
    confidence: f64,
    probabilities: BTreeMap<String, f64>,
}

#[derive(Serialize)]
struct AnalyzeOutput {
    shape: ShapeKind,
    size: usize,
    threshold: u8,
    object: Measurement,
    background: Option<Measurement>,
    n_training_samples: usize,
    tree: ModelPrediction,
    forest: ModelPrediction,
}

#[derive(Serialize)]
struct CrossValidateOutput {
    model: String,
    n_samples: usize,
    class_counts: BTreeMap<String, usize>,
    k: usize,
    fold_size: usize,
    fold_accuracies: Vec<f64>,
    mean_accuracy: f64,
    std_accuracy: f64,
    confusion_matrix: ConfusionMatrix,
    class_metrics: Vec<ClassMetrics>,
    feature_importances: Vec<RankedFeature>,
}

#[derive(Serialize)]
struct TemplatesOutput {
    resolution: usize,
    feature_names: Vec<String>,
    templates: Vec<Template>,
}

fn parse_shape(s: &str) -> Result<ShapeKind> {
    ShapeKind::parse(s).with_context(|| {
        format!("unknown shape: {s} (expected circle, square, rectangle, or triangle)")
    })
}

fn parse_model(s: &str) -> Result<ModelKind> {
    match s {
        "tree" => Ok(ModelKind::Tree),
        "forest" => Ok(ModelKind::Forest),
        other => anyhow::bail!("unknown model: {other} (expected tree or forest)"),
    }
}

fn tree_config(args: &ModelArgs) -> DecisionTreeConfig {
    DecisionTreeConfig::new()
        .with_max_depth(args.depth_cap())
        .with_min_samples_split(args.min_samples_split)
}

fn forest_config(args: &ModelArgs, seed: u64) -> Result<RandomForestConfig> {
    Ok(RandomForestConfig::new(args.n_trees)?
        .with_max_depth(args.depth_cap())
        .with_min_samples_split(args.min_samples_split)
        .with_sample_ratio(args.sample_ratio)
        .with_seed(seed))
}

fn build_dataset(args: &DatasetArgs, seed: u64) -> Result<Dataset> {
    let dataset = SyntheticShapes::new()
        .with_per_class(args.per_class)
        .with_canvas(args.canvas)
        .with_seed(seed)
        .build()
        .context("failed to generate synthetic dataset")?;
    info!(n_samples = dataset.len(), "synthetic dataset generated");
    Ok(dataset)
}

fn moment_entries(get: impl Fn(usize, usize) -> f64) -> Vec<MomentEntry> {
    let mut entries = Vec::new();
    for order in 0..=3 {
        for p in (0..=order).rev() {
            let q = order - p;
            entries.push(MomentEntry {
                p,
                q,
                value: get(p, q),
            });
        }
    }
    entries
}

fn measure(mask: &BinaryMask, matcher: &TemplateMatcher) -> Measurement {
    let moments = MomentSet::from_mask(mask);
    let features = extract_features(mask);
    Measurement {
        area: size_area(mask),
        centroid: moments.centroid(),
        bounding_box: BoundingBox::of(mask),
        principal_axis: principal_axis(mask),
        raw_moments: moment_entries(|p, q| moments.raw(p, q)),
        central_moments: moment_entries(|p, q| moments.central(p, q)),
        hu: hu_moments(mask),
        features,
        template: matcher.classify_features(&features),
    }
}

/// Render `shape`, binarize it and measure the object (and optionally the
/// background) against the fixed 200-pixel templates.
fn measure_scene(
    shape: ShapeKind,
    size: usize,
    t: u8,
    foreground: u8,
    background: u8,
    dual: bool,
) -> (Measurement, Option<Measurement>) {
    let scene = render_scene(shape, size, foreground, background);
    let mask = threshold(&equalize(&scene), t);
    info!(%shape, size, area = mask.count(), "scene binarized");

    let matcher = TemplateMatcher::new();
    let object = measure(&mask, &matcher);
    let background = dual.then(|| measure(&mask.inverted(), &matcher));
    (object, background)
}

/// Predicted label with `probability * 100` as its confidence.
fn model_prediction(classes: &[String], probabilities: &[f64]) -> ModelPrediction {
    let (best, best_p) = probabilities
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |acc, (i, p)| if p > acc.1 { (i, p) } else { acc });
    ModelPrediction {
        label: classes.get(best).cloned().unwrap_or_default(),
        confidence: best_p.max(0.0) * 100.0,
        probabilities: classes.iter().cloned().zip(probabilities.iter().copied()).collect(),
    }
}

fn cross_validate<E: Estimator>(
    name: &str,
    estimator: &E,
    dataset: &Dataset,
    k: usize,
    seed: u64,
) -> Result<CrossValidateOutput> {
    let cv = CrossValidation::new(k)?.with_seed(seed);
    let result = dataset
        .cross_validate(&cv, estimator)
        .context("cross-validation failed")?;
    info!(
        mean_accuracy = result.mean_accuracy,
        std_accuracy = result.std_accuracy,
        "cross-validation complete"
    );

    Ok(CrossValidateOutput {
        model: name.to_string(),
        n_samples: dataset.len(),
        class_counts: dataset
            .class_counts()
            .into_iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect(),
        k: result.n_folds,
        fold_size: result.fold_size,
        fold_accuracies: result.fold_accuracies.clone(),
        mean_accuracy: result.mean_accuracy,
        std_accuracy: result.std_accuracy,
        class_metrics: result.confusion_matrix.class_metrics(),
        feature_importances: result.ranked_importances(dataset.feature_names()),
        confusion_matrix: result.confusion_matrix,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Analyze {
            shape,
            size,
            threshold: t,
            foreground,
            background,
            dual,
            dataset,
            model,
        } => {
            let shape = parse_shape(&shape)?;
            anyhow::ensure!(size > 0, "scene size must be >= 1");

            // 1. Render, binarize, measure and match templates
            let (object, background_measurement) =
                measure_scene(shape, size, t, foreground, background, dual);
            info!(
                template = %object.template.label,
                distance = object.template.distance,
                "template match"
            );

            // 2. Train on a fresh synthetic dataset
            let training = build_dataset(&dataset, cli.seed)?;
            let tree = tree_config(&model)
                .fit(training.features(), training.labels())
                .context("decision tree training failed")?;
            let forest = forest_config(&model, cli.seed)?
                .fit(training.features(), training.labels())
                .context("random forest training failed")?;
            info!(
                tree_depth = tree.depth(),
                n_trees = forest.n_trees(),
                "models trained"
            );

            // 3. Classify the scene
            let row = object.features.to_vec();
            let tree_proba = tree.predict_proba(&row).context("tree prediction failed")?;
            let forest_proba = forest
                .predict_proba(&row)
                .context("forest prediction failed")?;

            let output = AnalyzeOutput {
                shape,
                size,
                threshold: t,
                tree: model_prediction(tree.classes().as_slice(), &tree_proba),
                forest: model_prediction(forest.classes().as_slice(), forest_proba.as_slice()),
                object,
                background: background_measurement,
                n_training_samples: training.len(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::CrossValidate {
            model,
            k,
            dataset,
            params,
        } => {
            let kind = parse_model(&model)?;
            let training = build_dataset(&dataset, cli.seed)?;
            let output = match kind {
                ModelKind::Tree => {
                    cross_validate(&model, &tree_config(&params), &training, k, cli.seed)?
                }
                ModelKind::Forest => cross_validate(
                    &model,
                    &forest_config(&params, cli.seed)?,
                    &training,
                    k,
                    cli.seed,
                )?,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Templates { resolution } => {
            anyhow::ensure!(resolution > 0, "template resolution must be >= 1");
            let matcher = TemplateMatcher::with_resolution(resolution);
            let output = TemplatesOutput {
                resolution,
                feature_names: hutree_moments::feature_names(),
                templates: matcher.templates().to_vec(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_args(argv: &[&str]) -> ModelArgs {
        let cli = Cli::try_parse_from(argv.iter().copied()).unwrap();
        match cli.command {
            Command::CrossValidate { params, .. } => params,
            _ => panic!("expected cross-validate"),
        }
    }

    #[test]
    fn depth_flag_defaults_to_ten() {
        let args = model_args(&["hutree", "cross-validate"]);
        assert_eq!(tree_config(&args).max_depth(), Some(10));
    }

    #[test]
    fn zero_depth_is_a_cap_not_unlimited() {
        let args = model_args(&["hutree", "cross-validate", "--max-depth", "0"]);
        assert_eq!(tree_config(&args).max_depth(), Some(0));
        assert_eq!(forest_config(&args, 1).unwrap().max_depth(), Some(0));
    }

    #[test]
    fn unlimited_depth_flag_drops_the_cap() {
        let args = model_args(&["hutree", "cross-validate", "--unlimited-depth"]);
        assert_eq!(tree_config(&args).max_depth(), None);
        assert!(
            Cli::try_parse_from(["hutree", "cross-validate", "--unlimited-depth", "--max-depth", "3"])
                .is_err()
        );
    }

    #[test]
    fn small_scenes_match_full_size_templates() {
        let (object, background) = measure_scene(ShapeKind::Triangle, 64, 128, 200, 40, false);
        assert!(background.is_none());

        let canonical = ShapeKind::Triangle.canonical_mask(64);
        let fixed = TemplateMatcher::new().classify(&canonical);
        let rescaled = TemplateMatcher::with_resolution(64).classify(&canonical);
        assert!(rescaled.distance < 1e-9);
        assert!(fixed.distance > 1e-3);
        assert!((object.template.distance - fixed.distance).abs() < 1e-9);
        assert_eq!(object.template.label, fixed.label);
    }

    #[test]
    fn full_size_scene_matches_its_template_exactly() {
        let (object, background) = measure_scene(ShapeKind::Square, 200, 128, 200, 40, true);
        assert_eq!(object.template.label, ShapeKind::Square);
        assert!(object.template.distance < 1e-9);
        assert!(background.is_some());
    }
}
