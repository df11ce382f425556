use clap::Args;
use corecrew::workflows::hiring::{normalize_position, PositionCatalog, QuestionBank};

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Print the interview questions asked for this position (title, key, or free text)
    #[arg(long)]
    pub(crate) position: Option<String>,
}

pub(crate) fn run_catalog(args: CatalogArgs) {
    let catalog = PositionCatalog::standard();
    let bank = QuestionBank::standard();
    match args.position {
        Some(position) => print!("{}", render_questions(&catalog, &bank, &position)),
        None => print!("{}", render_positions(&catalog, &bank)),
    }
}

fn render_positions(catalog: &PositionCatalog, bank: &QuestionBank) -> String {
    let mut output = String::from("Open positions\n==============\n");
    for position in catalog.positions() {
        let questions = bank.questions_for_position(position.title);
        let set = if questions.is_default() {
            "default questions"
        } else {
            "dedicated questions"
        };
        output.push_str(&format!(
            "- {:<40} /jobs/{:<36} {} ({set})\n",
            position.title, position.key, position.posted
        ));
    }
    output
}

fn render_questions(catalog: &PositionCatalog, bank: &QuestionBank, submitted: &str) -> String {
    let title = catalog
        .resolve(submitted)
        .map(|position| position.title)
        .unwrap_or(submitted);
    let normalized = normalize_position(title);
    let questions = bank.questions_for(&normalized);

    let mut output = format!("Interview for {title}\nLookup key: {normalized}\n");
    match questions.bank_key {
        Some(key) => output.push_str(&format!("Question set: {key}\n\n")),
        None => output.push_str("Question set: default\n\n"),
    }
    for (index, question) in questions.questions.iter().enumerate() {
        output.push_str(&format!("{}. [{}] {}\n", index + 1, question.key, question.prompt));
    }
    output
}
