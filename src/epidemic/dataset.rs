//! Loading a population from its textual description.
//!
//! # Format
//!
//! Whitespace-separated unsigned integers:
//!
//! 1. `n m`: population size and number of initially infected persons,
//! 2. an `n × n` relation matrix; a non-zero entry at row `i`, column `j`
//!    relates `i` and `j` (either triangle is enough, the diagonal is ignored),
//! 3. `m` infected person indices.
//!
//! Anything after the last infected index is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::population::Population;
use super::types::Person;

/// Errors raised while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of dataset, expected {expected}")]
    UnexpectedEnd { expected: String },

    #[error("invalid token '{token}' for {expected}")]
    InvalidToken { token: String, expected: String },

    #[error("infected person {person} outside population of size {size}")]
    PersonOutOfRange { person: Person, size: usize },
}

impl Population {
    /// Reads a population from `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Reads a population from any buffered source.
    ///
    /// ```
    /// use u_contagion::epidemic::Population;
    ///
    /// let text = "3 1\n0 1 0\n1 0 1\n0 1 0\n0\n";
    /// let pop = Population::from_reader(text.as_bytes()).unwrap();
    /// assert_eq!(pop.size(), 3);
    /// assert_eq!(pop.relations().len(), 2);
    /// assert!(pop.is_infected(0));
    /// ```
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DatasetError> {
        let mut tokens = Tokens::new(reader);

        let size = tokens.next_number(|| "population size".into())?;
        let infected_count = tokens.next_number(|| "infected count".into())?;

        let mut population = Population::new(size);
        for i in 0..size {
            for j in 0..size {
                let entry = tokens.next_number(|| format!("relation matrix entry ({i}, {j})"))?;
                if entry != 0 {
                    population.add_relation(i, j);
                }
            }
        }

        for k in 0..infected_count {
            let person = tokens.next_number(|| format!("infected person #{k}"))?;
            if person >= size {
                return Err(DatasetError::PersonOutOfRange { person, size });
            }
            population.add_infected(person);
        }

        Ok(population)
    }
}

/// Whitespace tokenizer over a buffered reader, one line at a time.
struct Tokens<R> {
    reader: R,
    pending: std::vec::IntoIter<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new().into_iter(),
        }
    }

    fn next_token(&mut self) -> Result<Option<String>, DatasetError> {
        loop {
            if let Some(token) = self.pending.next() {
                return Ok(Some(token));
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending = line
                .split_whitespace()
                .map(str::to_owned)
                .collect::<Vec<_>>()
                .into_iter();
        }
    }

    /// Parses the next token. `expected` names it in errors only.
    fn next_number(&mut self, expected: impl Fn() -> String) -> Result<usize, DatasetError> {
        let token = self
            .next_token()?
            .ok_or_else(|| DatasetError::UnexpectedEnd {
                expected: expected(),
            })?;
        token.parse().map_err(|_| DatasetError::InvalidToken {
            token,
            expected: expected(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epidemic::Relation;

    const SIX: &str = "\
6 2
0 0 1 1 0 0
0 0 1 0 0 1
1 1 0 1 1 0
1 0 1 0 1 1
0 0 1 1 0 0
0 1 0 1 0 0
0 1
";

    #[test]
    fn test_parse_matrix() {
        let pop = Population::from_reader(SIX.as_bytes()).unwrap();
        assert_eq!(pop.size(), 6);
        assert_eq!(pop.relations().len(), 8);
        assert!(pop.relations().contains(&Relation::new(3, 5).unwrap()));
        assert_eq!(pop.infected().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(pop.infected_neighbors(2).len(), 2);
    }

    #[test]
    fn test_upper_triangle_is_enough() {
        let text = "3 0\n0 1 1\n0 0 0\n0 0 0\n";
        let pop = Population::from_reader(text.as_bytes()).unwrap();
        assert_eq!(pop.relations().len(), 2);
        assert!(pop.neighbors(1).contains(&0));
    }

    #[test]
    fn test_diagonal_ignored() {
        let text = "2 0\n1 0\n0 1\n";
        let pop = Population::from_reader(text.as_bytes()).unwrap();
        assert!(pop.relations().is_empty());
    }

    #[test]
    fn test_truncated_matrix() {
        let text = "3 0\n0 1 0\n1 0\n";
        let err = Population::from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::UnexpectedEnd { .. }));
        assert!(err.to_string().contains("(1, 2)"));
    }

    #[test]
    fn test_missing_infected() {
        let text = "2 2\n0 1\n1 0\n1\n";
        let err = Population::from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_invalid_token() {
        let text = "2 x\n";
        let err = Population::from_reader(text.as_bytes()).unwrap_err();
        match err {
            DatasetError::InvalidToken { token, expected } => {
                assert_eq!(token, "x");
                assert_eq!(expected, "infected count");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_infected_out_of_range() {
        let text = "2 1\n0 1\n1 0\n5\n";
        let err = Population::from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::PersonOutOfRange { person: 5, size: 2 }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Population::from_file("/nonexistent/u-contagion/dataset.txt").unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
