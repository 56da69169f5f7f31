//! Interactive header inspector, started when crxtool runs without arguments.
//!
//! Only the header of the highlighted file is read. The payload is touched
//! when the user asks for it to be extracted.

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crxtool::crx::{
    archive::extract_zip_to_directory, parse_metadata, AsymmetricKeyProof, CrxMetadata,
    ProofAlgorithm,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    DefaultTerminal, Frame,
};
use std::{
    env, fs,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Files,
    Proofs,
}

/// Outcome of reading the header of one file.
#[derive(Debug)]
enum Inspection {
    Parsed(CrxMetadata),
    Failed(String),
}

struct Inspector {
    dir: PathBuf,
    files: Vec<PathBuf>,
    file_state: ListState,
    focus: Pane,
    algorithm: usize,
    proof_state: ListState,
    inspection: Option<Inspection>,
    status: String,
}

fn step(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }

    Some(match (current, forward) {
        (None, _) => 0,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    })
}

fn inspect(path: &Path) -> Inspection {
    let result = fs::File::open(path)
        .map_err(anyhow::Error::from)
        .and_then(|file| Ok(parse_metadata(&mut BufReader::new(file))?));

    match result {
        Ok(metadata) => Inspection::Parsed(metadata),
        Err(err) => Inspection::Failed(err.to_string()),
    }
}

/// Reads the header, then extracts whatever follows it into `out/<stem>/`.
fn extract_payload(crx_path: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let mut input = BufReader::new(fs::File::open(crx_path)?);
    parse_metadata(&mut input)?;
    let mut zip = Vec::new();
    input.read_to_end(&mut zip)?;

    let stem = crx_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("extension");
    let target = out_dir.join(stem);
    if target.exists() {
        fs::remove_dir_all(&target)
            .with_context(|| format!("Failed to replace {}", target.display()))?;
    }
    extract_zip_to_directory(&zip, &target)?;

    Ok(target)
}

impl Inspector {
    fn open(dir: PathBuf) -> anyhow::Result<Self> {
        let mut inspector = Self {
            dir,
            files: Vec::new(),
            file_state: ListState::default(),
            focus: Pane::Files,
            algorithm: 0,
            proof_state: ListState::default(),
            inspection: None,
            status: String::new(),
        };
        inspector.rescan()?;

        Ok(inspector)
    }

    fn rescan(&mut self) -> anyhow::Result<()> {
        self.files = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "crx"))
            .collect();
        self.files.sort();

        let selected = step(None, self.files.len(), true);
        self.file_state.select(selected);
        self.reload();
        self.status = format!("{} CRX file(s) in {}", self.files.len(), self.dir.display());

        Ok(())
    }

    fn selected_file(&self) -> Option<&PathBuf> {
        self.file_state.selected().and_then(|i| self.files.get(i))
    }

    fn reload(&mut self) {
        self.inspection = self.selected_file().map(|path| inspect(path));
        self.proof_state
            .select(step(None, self.current_proofs().len(), true));
    }

    fn algorithm(&self) -> ProofAlgorithm {
        ProofAlgorithm::ALL[self.algorithm]
    }

    fn current_proofs(&self) -> Vec<AsymmetricKeyProof> {
        match &self.inspection {
            Some(Inspection::Parsed(metadata)) => metadata
                .file_header()
                .asymmetric_key_proofs(self.algorithm()),
            _ => Vec::new(),
        }
    }

    fn move_selection(&mut self, forward: bool) {
        match self.focus {
            Pane::Files => {
                let next = step(self.file_state.selected(), self.files.len(), forward);
                self.file_state.select(next);
                self.reload();
            }
            Pane::Proofs => {
                let len = self.current_proofs().len();
                let next = step(self.proof_state.selected(), len, forward);
                self.proof_state.select(next);
            }
        }
    }

    fn cycle_algorithm(&mut self, forward: bool) {
        let len = ProofAlgorithm::ALL.len();
        self.algorithm = step(Some(self.algorithm), len, forward).unwrap_or(0);
        self.proof_state
            .select(step(None, self.current_proofs().len(), true));
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Files => Pane::Proofs,
            Pane::Proofs => Pane::Files,
        };
    }

    fn extract_selected(&mut self) {
        let Some(path) = self.selected_file().cloned() else {
            return;
        };

        self.status = match extract_payload(&path, &self.dir.join("out")) {
            Ok(target) => format!("Extracted payload to {}", target.display()),
            Err(err) => format!("Extraction failed: {:#}", err),
        };
    }

    /// Returns false when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> anyhow::Result<bool> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Right | KeyCode::Char('l') => self.cycle_algorithm(true),
            KeyCode::Left | KeyCode::Char('h') => self.cycle_algorithm(false),
            KeyCode::Tab => self.toggle_focus(),
            KeyCode::Char('x') => self.extract_selected(),
            KeyCode::Char('r') => self.rescan()?,
            _ => {}
        }

        Ok(true)
    }
}

pub fn run_tui() -> anyhow::Result<()> {
    let mut inspector = Inspector::open(env::current_dir()?)?;

    let mut terminal = ratatui::try_init()?;
    let result = event_loop(&mut terminal, &mut inspector);
    ratatui::restore();

    result
}

fn event_loop(terminal: &mut DefaultTerminal, inspector: &mut Inspector) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, inspector))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && !inspector.handle_key(key.code)? {
                return Ok(());
            }
        }
    }
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused { Color::Cyan } else { Color::DarkGray };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn draw(frame: &mut Frame, inspector: &mut Inspector) {
    let [body, status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(frame.area());
    let [files, details] =
        Layout::horizontal([Constraint::Percentage(30), Constraint::Min(0)]).areas(body);

    draw_files(frame, files, inspector);
    draw_details(frame, details, inspector);

    let help = "↑/↓ move | Tab pane | ←/→ algorithm | x extract | r rescan | q quit";
    let status_text = vec![
        Line::from(inspector.status.as_str()),
        Line::styled(help, Style::default().fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(status_text), status);
}

fn draw_files(frame: &mut Frame, area: Rect, inspector: &mut Inspector) {
    let items: Vec<ListItem> = inspector
        .files
        .iter()
        .map(|path| {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            ListItem::new(name.unwrap_or_default())
        })
        .collect();

    let list = List::new(items)
        .block(pane_block(
            "CRX files".to_string(),
            inspector.focus == Pane::Files,
        ))
        .highlight_symbol("> ")
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(list, area, &mut inspector.file_state);
}

fn draw_details(frame: &mut Frame, area: Rect, inspector: &mut Inspector) {
    let metadata = match &inspector.inspection {
        Some(Inspection::Parsed(metadata)) => metadata,
        Some(Inspection::Failed(err)) => {
            let error = Paragraph::new(format!("Not a readable CRX header:\n\n{}", err))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false })
                .block(pane_block("Header".to_string(), false));
            frame.render_widget(error, area);
            return;
        }
        None => {
            let empty = Paragraph::new("No CRX file selected")
                .block(pane_block("Header".to_string(), false));
            frame.render_widget(empty, area);
            return;
        }
    };

    let [summary, tabs, proofs, proof] = Layout::vertical([
        Constraint::Length(7),
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Min(0),
    ])
    .areas(area);

    let header = metadata.file_header();
    let declared = header
        .declared_id()
        .map(|id| format!("declared id {}", id))
        .unwrap_or_else(|| "no declared id".to_string());
    let summary_lines = vec![
        Line::styled(
            metadata.id().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from(format!(
            "{} | magic {}",
            metadata.version(),
            metadata.magic_number()
        )),
        Line::from(format!(
            "header {} bytes | payload at offset {}",
            header.header_byte_length(),
            metadata.payload_offset()
        )),
        Line::from(declared),
        Line::from(format!(
            "{} proof(s) in total",
            header.all_asymmetric_key_proofs().len()
        )),
    ];
    frame.render_widget(
        Paragraph::new(summary_lines).block(pane_block("Header".to_string(), false)),
        summary,
    );

    let titles: Vec<Line> = ProofAlgorithm::ALL
        .iter()
        .map(|algorithm| {
            let count = header.asymmetric_key_proofs(*algorithm).len();
            Line::from(format!("{} ({})", algorithm, count))
        })
        .collect();
    frame.render_widget(
        Tabs::new(titles)
            .select(inspector.algorithm)
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(pane_block("Algorithm".to_string(), false)),
        tabs,
    );

    let current = header.asymmetric_key_proofs(inspector.algorithm());
    let items: Vec<ListItem> = current
        .iter()
        .enumerate()
        .map(|(i, p)| {
            ListItem::new(format!(
                "#{} key {} bytes, signature {} bytes",
                i,
                p.public_key_length(),
                p.signature_length()
            ))
        })
        .collect();
    let list = List::new(items)
        .block(pane_block(
            "Proofs".to_string(),
            inspector.focus == Pane::Proofs,
        ))
        .highlight_symbol("> ")
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, proofs, &mut inspector.proof_state);

    let detail = match inspector.proof_state.selected().and_then(|i| current.get(i)) {
        Some(p) => format!(
            "public key (base64)\n{}\n\nsignature (base64)\n{}",
            p.public_key_base64(),
            p.signature_base64()
        ),
        None => format!("No {} proofs in this header", inspector.algorithm()),
    };
    frame.render_widget(
        Paragraph::new(detail)
            .wrap(Wrap { trim: false })
            .block(pane_block("Proof".to_string(), false)),
        proof,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn crx2(public_key: &[u8], signature: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut data = b"Cr24".to_vec();
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&(public_key.len() as u32).to_le_bytes());
        data.extend_from_slice(&(signature.len() as u32).to_le_bytes());
        data.extend_from_slice(public_key);
        data.extend_from_slice(signature);
        data.extend_from_slice(payload);
        data
    }

    fn parsed_id(inspector: &Inspector) -> Option<String> {
        match &inspector.inspection {
            Some(Inspection::Parsed(metadata)) => Some(metadata.id().to_string()),
            _ => None,
        }
    }

    #[test]
    fn step_wraps_both_ways() {
        assert_eq!(step(None, 0, true), None);
        assert_eq!(step(None, 3, false), Some(0));
        assert_eq!(step(Some(2), 3, true), Some(0));
        assert_eq!(step(Some(0), 3, false), Some(2));
    }

    #[test]
    fn lists_crx_files_and_inspects_the_selection() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.crx"), crx2(b"abc", b"sig", b"")).unwrap();
        fs::write(dir.path().join("b.crx"), b"not a crx").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut inspector = Inspector::open(dir.path().to_path_buf()).unwrap();

        assert_eq!(inspector.files.len(), 2);
        assert_eq!(
            parsed_id(&inspector).as_deref(),
            Some("lkhibglpipabmpokebebeanofnkocccd")
        );

        inspector.handle_key(KeyCode::Down).unwrap();
        assert!(matches!(inspector.inspection, Some(Inspection::Failed(_))));
        assert!(!inspector.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn algorithm_tabs_select_matching_proofs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.crx"), crx2(b"abc", b"sig", b"")).unwrap();
        let mut inspector = Inspector::open(dir.path().to_path_buf()).unwrap();

        assert_eq!(inspector.algorithm(), ProofAlgorithm::Sha1WithRsa);
        assert_eq!(inspector.current_proofs().len(), 1);
        assert_eq!(inspector.proof_state.selected(), Some(0));

        inspector.handle_key(KeyCode::Right).unwrap();
        assert_eq!(inspector.algorithm(), ProofAlgorithm::Sha256WithRsa);
        assert!(inspector.current_proofs().is_empty());
        assert_eq!(inspector.proof_state.selected(), None);

        inspector.handle_key(KeyCode::Left).unwrap();
        inspector.handle_key(KeyCode::Left).unwrap();
        assert_eq!(inspector.algorithm(), ProofAlgorithm::Sha256WithEcdsa);
    }

    #[test]
    fn extract_reports_bad_payload_without_failing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.crx"), crx2(b"abc", b"sig", b"not a zip")).unwrap();
        let mut inspector = Inspector::open(dir.path().to_path_buf()).unwrap();

        inspector.handle_key(KeyCode::Char('x')).unwrap();

        assert!(inspector.status.starts_with("Extraction failed"));
    }
}
