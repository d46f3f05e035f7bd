use clap::Args;
use std::io::Read;
use survey_ai::error::AppError;
use survey_ai::workflows::assessment::{derive_recommendations, score_profile};
use survey_ai::workflows::intake::{
    parse_fields, to_canonical_json, validate_answers, ParserInput,
};

#[derive(Args, Debug)]
pub(crate) struct ParseArgs {
    /// Transcript text to parse; reads stdin when omitted
    #[arg(long)]
    text: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    #[arg(long, default_value_t = 0)]
    age: u32,
    #[arg(long)]
    smoker: bool,
    #[arg(long, default_value = "")]
    exercise: String,
    #[arg(long, default_value = "")]
    diet: String,
}

pub(crate) fn run_parse(args: ParseArgs) -> Result<(), AppError> {
    let text = match args.text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let Some(fields) = parse_fields(ParserInput::Text(text)) else {
        println!("Extraction failed: nothing recognizable in the input.");
        return Ok(());
    };

    println!("Recovered fields:");
    println!(
        "{}",
        serde_json::to_string_pretty(&to_canonical_json(&fields))
            .unwrap_or_else(|_| "{}".to_string())
    );

    let result = validate_answers(Some(&fields));
    println!();
    println!(
        "Answers: age={} smoker={} exercise={:?} diet={:?}",
        result.answers.age, result.answers.smoker, result.answers.exercise, result.answers.diet
    );
    if result.missing_fields.is_empty() {
        println!("All survey fields present.");
    } else {
        println!("Missing fields: {}", result.missing_fields.join(", "));
    }
    println!("Confidence: {:.2}", result.confidence);

    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        age,
        smoker,
        exercise,
        diet,
    } = args;

    let risk = score_profile(age, smoker, &exercise, &diet);
    println!("Risk level: {} (score {})", risk.level, risk.score);
    for component in &risk.components {
        println!("  +{:<3} {}", component.points, component.kind.rationale_label());
    }

    println!("Recommendations:");
    for recommendation in derive_recommendations(smoker, &exercise, &diet) {
        println!("  - {recommendation}");
    }

    Ok(())
}
