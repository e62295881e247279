use crate::batch::BatchWriter;
use crate::error::{Result, SisBatchError};
use crate::links::CanvasLinks;
use crate::record::UserRecord;
use crate::session::prompt::Prompter;
use serde::Serialize;
use std::io::{BufRead, Write};
use tracing::{debug, info};

const FIELD_PROMPTS: [&str; 4] = [
    "Enter User ID: ",
    "Enter First Name: ",
    "Enter Last Name: ",
    "Enter Email Address: ",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Collecting,
    Confirming(UserRecord),
    Committed(UserRecord),
    Discarded(UserRecord),
    AskingAnother,
    Finished,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSummary {
    pub committed: Vec<UserRecord>,
    pub discarded: usize,
    /// Most recent user ID that made it into a complete record.
    pub last_user_id: Option<String>,
    pub input_closed: bool,
}

pub struct Session<'a, R, W> {
    prompter: Prompter<R, W>,
    writer: &'a BatchWriter,
    links: &'a CanvasLinks,
    summary: SessionSummary,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(prompter: Prompter<R, W>, writer: &'a BatchWriter, links: &'a CanvasLinks) -> Self {
        Self {
            prompter,
            writer,
            links,
            summary: SessionSummary::default(),
        }
    }

    /// Drives the loop until the operator stops or input runs out.
    ///
    /// A write failure ends the session immediately with that error.
    pub fn run(mut self) -> Result<SessionSummary> {
        let mut state = SessionState::Collecting;

        while state != SessionState::Finished {
            state = self.step(state)?;
        }

        info!(
            committed = self.summary.committed.len(),
            discarded = self.summary.discarded,
            "session finished"
        );
        Ok(self.summary)
    }

    pub fn step(&mut self, state: SessionState) -> Result<SessionState> {
        debug!(?state, "session step");
        match state {
            SessionState::Collecting => self.collect(),
            SessionState::Confirming(record) => self.confirm(record),
            SessionState::Committed(record) => self.commit(record),
            SessionState::Discarded(_) => {
                self.summary.discarded += 1;
                self.prompter.say(
                    "Details not confirmed. The data has been discarded. Please re-enter your details.",
                )?;
                Ok(SessionState::Collecting)
            }
            SessionState::AskingAnother => {
                match self
                    .prompter
                    .confirm("Do you want to add another user? (Yes/y or No/n): ")?
                {
                    Some(true) => Ok(SessionState::Collecting),
                    Some(false) => Ok(SessionState::Finished),
                    None => Ok(self.input_closed()),
                }
            }
            SessionState::Finished => Ok(SessionState::Finished),
        }
    }

    fn collect(&mut self) -> Result<SessionState> {
        let mut answers = Vec::with_capacity(FIELD_PROMPTS.len());
        for prompt in FIELD_PROMPTS {
            match self.prompter.ask(prompt)? {
                Some(answer) => answers.push(answer),
                None => return Ok(self.input_closed()),
            }
        }

        match UserRecord::from_input(&answers[0], &answers[1], &answers[2], &answers[3]) {
            Ok(record) => {
                self.summary.last_user_id = Some(record.user_id.clone());
                Ok(SessionState::Confirming(record))
            }
            Err(SisBatchError::MissingField { field }) => {
                debug!(field, "incomplete record");
                self.prompter
                    .say("All fields are required. Please enter the details again.")?;
                Ok(SessionState::Collecting)
            }
            Err(e) => Err(e),
        }
    }

    fn confirm(&mut self, record: UserRecord) -> Result<SessionState> {
        self.prompter.say("Please confirm the entered details:")?;
        self.prompter.say(&record.to_string())?;

        match self
            .prompter
            .confirm("Is the information correct? (Yes/y or No/n): ")?
        {
            Some(true) => Ok(SessionState::Committed(record)),
            Some(false) => Ok(SessionState::Discarded(record)),
            None => Ok(self.input_closed()),
        }
    }

    fn commit(&mut self, record: UserRecord) -> Result<SessionState> {
        self.writer.commit(&record)?;

        let files = self.writer.files();
        self.prompter
            .say(&format!("Sandbox details saved to {}", files.sandbox.display()))?;
        self.prompter
            .say(&format!("User details saved to {}", files.user.display()))?;

        let course_url = self.links.course_url(&record.course_id());
        self.prompter.say(course_url.as_str())?;
        self.prompter.say("Details confirmed and saved.")?;

        self.summary.committed.push(record);
        Ok(SessionState::AskingAnother)
    }

    fn input_closed(&mut self) -> SessionState {
        debug!("input closed, ending session");
        self.summary.input_closed = true;
        SessionState::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BatchFiles, FilesConfig, SisConfig};
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        writer: BatchWriter,
        links: CanvasLinks,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let files = BatchFiles::in_directory(dir.path(), &FilesConfig::default());
            let sis = SisConfig::default();
            let links = CanvasLinks::from_config(&sis).unwrap();
            Self {
                writer: BatchWriter::new(files, sis),
                links,
                _dir: dir,
            }
        }

        fn run(&self, script: &str) -> (SessionSummary, String) {
            let mut output = Vec::new();
            let prompter = Prompter::new(Cursor::new(script.to_string()), &mut output);
            let summary = Session::new(prompter, &self.writer, &self.links).run().unwrap();
            (summary, String::from_utf8(output).unwrap())
        }

        fn data_rows(&self, path: &std::path::Path) -> usize {
            match fs::read_to_string(path) {
                Ok(content) => content.lines().count().saturating_sub(1),
                Err(_) => 0,
            }
        }
    }

    const JANE: &str = "jsmith\nJane\nSmith\njane.smith@example.com\n";

    #[test]
    fn test_single_confirmed_record() {
        let fixture = Fixture::new();
        let (summary, output) = fixture.run(&format!("{}y\nn\n", JANE));

        assert_eq!(summary.committed.len(), 1);
        assert_eq!(summary.discarded, 0);
        assert_eq!(summary.last_user_id.as_deref(), Some("jsmith"));
        assert!(!summary.input_closed);
        assert!(output.contains("https://canvas.acu.edu.au/courses/jsmith_sb"));
        assert!(output.contains("Details confirmed and saved."));

        let files = fixture.writer.files();
        let sandbox_line = format!("Sandbox details saved to {}", files.sandbox.display());
        let user_line = format!("User details saved to {}", files.user.display());
        let sandbox_at = output.find(&sandbox_line).unwrap();
        let user_at = output.find(&user_line).unwrap();
        assert!(sandbox_at < user_at);

        for path in fixture.writer.files().all() {
            assert_eq!(fixture.data_rows(path), 1);
        }
    }

    #[test]
    fn test_declined_confirmation_writes_nothing() {
        let fixture = Fixture::new();
        let (summary, output) = fixture.run(&format!("{}no\n", JANE));

        assert!(summary.committed.is_empty());
        assert_eq!(summary.discarded, 1);
        assert!(summary.input_closed);
        assert!(output.contains("The data has been discarded"));
        for path in fixture.writer.files().all() {
            assert!(!path.exists(), "{}", path.display());
        }
    }

    #[test]
    fn test_empty_field_reprompts_whole_set() {
        let fixture = Fixture::new();
        let script = format!("jsmith\n   \nSmith\njane@x\n{}YES\nno\n", JANE);
        let (summary, output) = fixture.run(&script);

        assert_eq!(output.matches("Enter User ID: ").count(), 2);
        assert_eq!(output.matches("All fields are required").count(), 1);
        assert_eq!(summary.committed.len(), 1);
        assert_eq!(summary.committed[0].first_name, "Jane");
    }

    #[test]
    fn test_discard_then_add_another() {
        let fixture = Fixture::new();
        let script = "a1\nAnn\nLee\nann@x\nn\n\
                      a1\nAnn\nLee\nann@example.com\ny\ny\n\
                      B2\nBo\nKim\nbo@example.com\nY\nnope\n";
        let (summary, _) = fixture.run(script);

        let ids: Vec<_> = summary.committed.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, ["a1", "B2"]);
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.last_user_id.as_deref(), Some("B2"));
        assert_eq!(fixture.data_rows(&fixture.writer.files().user), 2);
        assert!(fs::read_to_string(&fixture.writer.files().user)
            .unwrap()
            .contains("a1,a1,Ann,Lee,ann@example.com,Active"));
    }

    #[test]
    fn test_closed_mid_record_drops_it() {
        let fixture = Fixture::new();
        let (summary, _) = fixture.run("jsmith\nJane\n");

        assert!(summary.committed.is_empty());
        assert!(summary.last_user_id.is_none());
        assert!(summary.input_closed);
    }

    #[test]
    fn test_step_transitions() {
        let fixture = Fixture::new();
        let prompter = Prompter::new(Cursor::new("maybe\n"), Vec::new());
        let mut session = Session::new(prompter, &fixture.writer, &fixture.links);
        let record = UserRecord::from_input("jsmith", "Jane", "Smith", "j@x").unwrap();

        let next = session.step(SessionState::Confirming(record.clone())).unwrap();
        assert_eq!(next, SessionState::Discarded(record));
        assert_eq!(session.step(SessionState::Finished).unwrap(), SessionState::Finished);
    }
}
