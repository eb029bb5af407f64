use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, trace};

use crate::domain::{DashConfig, DashError, HELP_TEXT, Message, Result};
use crate::inputter::{InputResult, Inputter};
use crate::navigation::{Mode, View, activate};
use crate::session::Session;
use crate::table::SalesTable;
use crate::ui::{BODY_CHROME_HEIGHT, STATUSLINE_HEIGHT, TABS_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    VIEW,
    POPUP,
    CMDINPUT,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub body_height: usize,
    pub visible_rows: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let body_height = ui_height.saturating_sub(TABS_HEIGHT + STATUSLINE_HEIGHT);
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            body_height,
            visible_rows: body_height.saturating_sub(BODY_CHROME_HEIGHT),
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

/// Everything the ui needs besides the active view.
#[derive(Debug, Clone)]
pub struct UIData {
    pub mode: Mode,
    pub scroll: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub layout: UILayout,
    pub cmdinput: InputResult,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

pub struct Model {
    config: DashConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    session: Session,
    mode: Mode,
    view: View,
    scroll: usize,
    uilayout: UILayout,
    input: Inputter,
    last_input: InputResult,
    show_popup: bool,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &DashConfig, ui_width: usize, ui_height: usize) -> Self {
        let session = Session::new();
        let mode = Mode::default();
        let view = activate(mode, &session, config);
        Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::VIEW,
            previous_modus: Modus::VIEW,
            session,
            mode,
            view,
            scroll: 0,
            uilayout: UILayout::from_values(ui_width, ui_height),
            input: Inputter::default(),
            last_input: InputResult::default(),
            show_popup: false,
            status_message: "Press 'o' to open a sales file, '?' for help".to_string(),
            last_status_message_update: Instant::now(),
        }
    }

    /// Loads `path` into the session. On failure the previous table stays.
    pub fn load_data_file(&mut self, path: PathBuf) -> Result<()> {
        let start_time = Instant::now();
        let table = SalesTable::load(path)?;
        let message = format!(
            "Loaded {} ({} rows x {} cols) in {}ms",
            table.name(),
            table.height(),
            table.width(),
            start_time.elapsed().as_millis()
        );
        self.session.load(table);
        self.scroll = 0;
        self.refresh_view();
        self.set_status_message(message);
        Ok(())
    }

    pub fn get_uidata(&self) -> UIData {
        UIData {
            mode: self.mode,
            scroll: self.scroll,
            show_popup: self.show_popup,
            popup_message: HELP_TEXT.to_string(),
            layout: self.uilayout.clone(),
            cmdinput: self.last_input.clone(),
            active_cmdinput: self.modus == Modus::CMDINPUT,
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::CMDINPUT
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    /// Shows a failed interaction in the status line.
    pub fn report_error(&mut self, err: &DashError) {
        self.set_status_message(format!("Error: {err}"));
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    fn refresh_view(&mut self) {
        self.view = activate(self.mode, &self.session, &self.config);
    }

    fn select_mode(&mut self, mode: Mode) {
        info!("Selected mode {}", mode.label());
        self.mode = mode;
        self.scroll = 0;
        self.refresh_view();
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<()> {
        if let Some(msg) = message {
            match self.modus {
                Modus::VIEW => match msg {
                    Message::Quit => self.quit(),
                    Message::SelectMode(idx) => {
                        if let Some(mode) = Mode::from_index(idx) {
                            self.select_mode(mode);
                        }
                    }
                    Message::NextMode => self.select_mode(self.mode.next()),
                    Message::PreviousMode => self.select_mode(self.mode.previous()),
                    Message::MoveUp => self.scroll_up(1),
                    Message::MoveDown => self.scroll_down(1),
                    Message::MovePageUp => self.scroll_up(self.uilayout.visible_rows.max(1)),
                    Message::MovePageDown => self.scroll_down(self.uilayout.visible_rows.max(1)),
                    Message::MoveBeginning => self.scroll = 0,
                    Message::MoveEnd => self.scroll = self.max_scroll(),
                    Message::OpenFile => self.enter_cmd_mode(),
                    Message::Help => self.show_help(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::Help => self.exit(),
                    _ => (),
                },
                Modus::CMDINPUT => match msg {
                    Message::RawKey(key) => self.raw_input(key),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn exit(&mut self) {
        if self.modus == Modus::POPUP {
            trace!("Close popup ...");
            self.show_popup = false;
            self.modus = self.previous_modus;
            self.previous_modus = Modus::POPUP;
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.show_popup = true;
    }

    fn enter_cmd_mode(&mut self) {
        trace!("Entering path input ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.input.clear();
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            self.handle_cmd_input();
        }
    }

    fn handle_cmd_input(&mut self) {
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;

        let input = self.last_input.clone();
        self.input.clear();
        self.last_input = self.input.get();
        if input.canceled || input.input.trim().is_empty() {
            trace!("Path input canceled");
            return;
        }

        let loaded = input
            .expanded_path()
            .and_then(|path| self.load_data_file(path));
        if let Err(e) = loaded {
            error!("Loading {} failed: {e}", input.input);
            self.report_error(&e);
        }
    }

    /// Only the raw table echo scrolls.
    fn scrollable_rows(&self) -> usize {
        match &self.view {
            View::Load(Some(echo)) => echo.nrows,
            _ => 0,
        }
    }

    fn max_scroll(&self) -> usize {
        self.scrollable_rows()
            .saturating_sub(self.uilayout.visible_rows)
    }

    fn scroll_up(&mut self, size: usize) {
        self.scroll = self.scroll.saturating_sub(size);
    }

    fn scroll_down(&mut self, size: usize) {
        self.scroll = std::cmp::min(self.scroll + size, self.max_scroll());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MISSING_TABLE_WARNING;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::io::Write;

    fn write_csv(rows: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Rank,Name,Platform,Year,Genre,Publisher,NA_Sales,Global_Sales").unwrap();
        for i in 0..rows {
            writeln!(
                file,
                "{},Game {i},PC,{},Action,Pub,{}.5,{}.0",
                i + 1,
                2000 + i,
                i,
                i + 1
            )
            .unwrap();
        }
        file
    }

    fn type_path(model: &mut Model, path: &str) {
        for c in path.chars() {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            model.update(Some(Message::RawKey(key))).unwrap();
        }
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        model.update(Some(Message::RawKey(enter))).unwrap();
    }

    #[test]
    fn starts_in_load_mode_without_table() {
        let model = Model::init(&DashConfig::default(), 80, 24);
        assert_eq!(model.mode(), Mode::Load);
        assert_eq!(model.view(), &View::Load(None));
        assert_eq!(model.status, Status::READY);
    }

    #[test]
    fn indicators_without_table_show_warning() {
        let mut model = Model::init(&DashConfig::default(), 80, 24);
        model.update(Some(Message::SelectMode(2))).unwrap();
        assert_eq!(model.mode(), Mode::Indicators);
        assert_eq!(
            model.view(),
            &View::Warning(MISSING_TABLE_WARNING.to_string())
        );
    }

    #[test]
    fn open_file_through_prompt() {
        let file = write_csv(30);
        let mut model = Model::init(&DashConfig::default(), 80, 24);
        model.update(Some(Message::OpenFile)).unwrap();
        assert!(model.raw_keyevents());
        type_path(&mut model, &file.path().to_string_lossy());

        assert!(!model.raw_keyevents());
        match model.view() {
            View::Load(Some(echo)) => assert_eq!(echo.nrows, 30),
            other => panic!("unexpected view {other:?}"),
        }

        model.update(Some(Message::NextMode)).unwrap();
        assert!(matches!(model.view(), View::Explore(_)));
    }

    #[test]
    fn failed_load_keeps_previous_table() {
        let file = write_csv(3);
        let mut model = Model::init(&DashConfig::default(), 80, 24);
        model.load_data_file(file.path().to_path_buf()).unwrap();

        model.update(Some(Message::OpenFile)).unwrap();
        type_path(&mut model, "/does/not/exist.csv");
        assert_eq!(model.get_uidata().status_message, "Error: File not found");
        assert_eq!(model.session().require_table().unwrap().height(), 3);
    }

    #[test]
    fn scrolling_is_clamped_to_table() {
        let file = write_csv(30);
        let mut model = Model::init(&DashConfig::default(), 80, 24);
        model.load_data_file(file.path().to_path_buf()).unwrap();
        let visible = model.get_uidata().layout.visible_rows;

        model.update(Some(Message::MoveEnd)).unwrap();
        assert_eq!(model.get_uidata().scroll, 30 - visible);
        model.update(Some(Message::MoveDown)).unwrap();
        assert_eq!(model.get_uidata().scroll, 30 - visible);
        model.update(Some(Message::MoveBeginning)).unwrap();
        model.update(Some(Message::MoveUp)).unwrap();
        assert_eq!(model.get_uidata().scroll, 0);
    }

    #[test]
    fn help_popup_blocks_navigation() {
        let mut model = Model::init(&DashConfig::default(), 80, 24);
        model.update(Some(Message::Help)).unwrap();
        assert!(model.get_uidata().show_popup);
        model.update(Some(Message::NextMode)).unwrap();
        assert_eq!(model.mode(), Mode::Load);
        model.update(Some(Message::Exit)).unwrap();
        assert!(!model.get_uidata().show_popup);
        model.update(Some(Message::Quit)).unwrap();
        assert_eq!(model.status, Status::QUITTING);
    }
}
