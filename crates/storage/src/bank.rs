//! CSV question bank.
//!
//! A header row names the columns; matching is case-insensitive:
//!
//! - `set`, `number`: composite key of the question id (optional)
//! - `question`: the prompt
//! - `choice*`: every column whose header starts with `choice`, in file order
//! - `answer`: 1-based choice numbers (or letters `A`, `B`, ...) of the correct
//!   choices, separated by `;`, `,` or spaces
//!
//! Rows that do not form a valid question are skipped with a warning.

use std::collections::{BTreeSet, HashSet};
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};
use quiz_core::model::{Choice, QuestionError, QuestionId, QuestionRecord};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("could not read question bank: {0}")]
    Csv(#[from] csv::Error),

    #[error("question bank is missing the `{0}` column")]
    MissingColumn(&'static str),

    #[error("question bank has no choice columns")]
    NoChoiceColumns,
}

#[derive(Debug, Error)]
enum RowError {
    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error("unreadable answer `{raw}`")]
    InvalidAnswer { raw: String },

    #[error("answer refers to missing choice {number}")]
    AnswerOutOfRange { number: usize },
}

/// Load every valid question from the CSV file at `path`.
///
/// # Errors
///
/// Returns `BankError` if the file cannot be read or lacks required columns.
pub fn load_bank(path: &Path) -> Result<Vec<QuestionRecord>, BankError> {
    let reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;
    let questions = collect_questions(reader)?;
    info!("loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

/// Same as [`load_bank`] for an in-memory or streamed source.
///
/// # Errors
///
/// Returns `BankError` if the data cannot be read or lacks required columns.
pub fn read_bank<R: io::Read>(source: R) -> Result<Vec<QuestionRecord>, BankError> {
    let reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);
    collect_questions(reader)
}

fn collect_questions<R: io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<QuestionRecord>, BankError> {
    let columns = BankColumns::from_headers(reader.headers()?)?;

    let mut questions = Vec::new();
    let mut ids = HashSet::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;
        match columns.question(&record, row) {
            Ok(question) => {
                if ids.insert(question.id().clone()) {
                    questions.push(question);
                } else {
                    warn!("skipping row {row}: duplicate question id {}", question.id());
                }
            }
            Err(e) => warn!("skipping row {row}: {e}"),
        }
    }
    Ok(questions)
}

struct BankColumns {
    set: Option<usize>,
    number: Option<usize>,
    question: usize,
    choices: Vec<usize>,
    answer: usize,
}

impl BankColumns {
    fn from_headers(headers: &StringRecord) -> Result<Self, BankError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| names.iter().position(|h| h == name);

        let question = find("question").ok_or(BankError::MissingColumn("question"))?;
        let answer = find("answer").ok_or(BankError::MissingColumn("answer"))?;
        let choices: Vec<usize> = names
            .iter()
            .enumerate()
            .filter_map(|(i, h)| h.starts_with("choice").then_some(i))
            .collect();
        if choices.is_empty() {
            return Err(BankError::NoChoiceColumns);
        }

        Ok(Self {
            set: find("set"),
            number: find("number"),
            question,
            choices,
            answer,
        })
    }

    fn question(&self, record: &StringRecord, row: usize) -> Result<QuestionRecord, RowError> {
        let cell = |i: usize| record.get(i).unwrap_or("");
        let id = QuestionId::from_parts(
            self.set.map(cell),
            self.number.map(cell),
            row,
        );

        let correct = parse_answer(cell(self.answer))?;
        let mut choices = Vec::with_capacity(self.choices.len());
        let mut matched = BTreeSet::new();
        for (k, &column) in self.choices.iter().enumerate() {
            let number = k + 1;
            let text = cell(column);
            if text.is_empty() {
                continue;
            }
            let is_correct = correct.contains(&number);
            if is_correct {
                matched.insert(number);
            }
            choices.push(Choice::new(text, is_correct));
        }
        if let Some(&number) = correct.difference(&matched).next() {
            return Err(RowError::AnswerOutOfRange { number });
        }

        Ok(QuestionRecord::new(id, cell(self.question), choices)?)
    }
}

fn parse_answer(raw: &str) -> Result<BTreeSet<usize>, RowError> {
    let invalid = || RowError::InvalidAnswer {
        raw: raw.to_string(),
    };
    let mut numbers = BTreeSet::new();
    for token in raw
        .split(|c: char| c == ';' || c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let number = match token.parse::<usize>() {
            Ok(n) if n >= 1 => n,
            Ok(_) => return Err(invalid()),
            Err(_) => letter_number(token).ok_or_else(invalid)?,
        };
        numbers.insert(number);
    }
    if numbers.is_empty() {
        return Err(invalid());
    }
    Ok(numbers)
}

/// `A` -> 1, `b` -> 2, ...
fn letter_number(token: &str) -> Option<usize> {
    let mut chars = token.chars();
    let c = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() || !c.is_ascii_uppercase() {
        return None;
    }
    Some(usize::from(c as u8 - b'A') + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK: &str = "\
set,number,question,choice1,choice2,choice3,answer
1,1,Capital of France?,Paris,Rome,Madrid,1
1,2,Pick the primes,2,3,4,1;2
,7,No set given,yes,no,,A
1,3,Broken answer,x,y,,9
1,1,Duplicate id,a,b,,1
";

    #[test]
    fn reads_valid_rows_and_skips_bad_ones() {
        let questions = read_bank(BANK.as_bytes()).unwrap();
        let ids: Vec<_> = questions.iter().map(|q| q.id().as_str().to_string()).collect();
        assert_eq!(ids, vec!["1-1", "1-2", "row-3"]);

        assert_eq!(questions[0].correct_indices(), vec![0]);
        assert_eq!(questions[1].correct_indices(), vec![0, 1]);
        assert_eq!(questions[2].choices().len(), 2);
    }

    #[test]
    fn missing_question_column_is_an_error() {
        let err = read_bank("set,number,choice1,answer\n1,1,a,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, BankError::MissingColumn("question")));
    }

    #[test]
    fn no_choice_columns_is_an_error() {
        let err = read_bank("question,answer\nQ,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, BankError::NoChoiceColumns));
    }

    #[test]
    fn answer_parsing() {
        assert_eq!(parse_answer("1; 3").unwrap().into_iter().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(parse_answer("b,C").unwrap().into_iter().collect::<Vec<_>>(), vec![2, 3]);
        assert!(parse_answer("").is_err());
        assert!(parse_answer("0").is_err());
        assert!(parse_answer("maybe").is_err());
    }
}
