use super::*;

impl TuiApp {
    /// Returns true when the dashboard should exit.
    pub(in crate::tui) fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        match self.view {
            View::Repos => self.handle_repos(key),
            View::BaseDir | View::Credentials => {
                self.handle_form(key);
                false
            }
        }
    }

    fn handle_repos(&mut self, key: KeyEvent) -> bool {
        if key.code != KeyCode::Char('q') {
            self.quit_armed = false;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return self.request_quit(),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = clamp_index(self.selected + 1, self.rows.len()),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.rows.len().saturating_sub(1),
            KeyCode::Char('r') => self.start_rescan(),
            KeyCode::Char('f') => self.submit_selected(RepoTask::Fetch),
            KeyCode::Char('u') => self.submit_selected(RepoTask::FastForward),
            KeyCode::Char('p') => self.submit_selected(RepoTask::Push),
            KeyCode::Char('F') => self.submit_bulk(RepoTask::Fetch),
            KeyCode::Char('U') => self.submit_bulk(RepoTask::FastForward),
            KeyCode::Char('P') => self.submit_bulk(RepoTask::Push),
            KeyCode::Char('b') => self.open_form(View::BaseDir),
            KeyCode::Char('c') => self.open_form(View::Credentials),
            _ => {}
        }
        false
    }

    fn request_quit(&mut self) -> bool {
        let in_flight = self.context.executor().in_flight();
        if in_flight == 0 || self.quit_armed {
            return true;
        }
        self.quit_armed = true;
        self.show_message(format!(
            "{in_flight} task(s) still running; press q again to quit"
        ));
        false
    }

    fn open_form(&mut self, view: View) {
        self.input_fields = match view {
            View::BaseDir => vec![InputField::with_value(
                "Base directory",
                self.root.display().to_string(),
            )],
            View::Credentials => vec![
                InputField::new("Username"),
                InputField::with_mask("Secret"),
            ],
            View::Repos => Vec::new(),
        };
        self.input_index = 0;
        self.view = view;
    }

    fn close_form(&mut self) {
        self.input_fields.clear();
        self.input_index = 0;
        self.view = View::Repos;
    }

    fn handle_form(&mut self, key: KeyEvent) {
        let field_count = self.input_fields.len();
        match key.code {
            KeyCode::Esc => {
                self.close_form();
                self.show_message("Cancelled");
            }
            KeyCode::Tab | KeyCode::Down if field_count > 0 => {
                self.input_index = (self.input_index + 1) % field_count;
            }
            KeyCode::BackTab | KeyCode::Up if field_count > 0 => {
                self.input_index = (self.input_index + field_count - 1) % field_count;
            }
            KeyCode::Backspace => {
                if let Some(field) = self.input_fields.get_mut(self.input_index) {
                    field.value.pop();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(field) = self.input_fields.get_mut(self.input_index) {
                    field.value.push(ch);
                }
            }
            KeyCode::Enter => match self.view {
                View::BaseDir => self.save_base_dir(),
                View::Credentials => self.save_credential(),
                View::Repos => {}
            },
            _ => {}
        }
    }

    fn field_value(&self, index: usize) -> String {
        self.input_fields
            .get(index)
            .map(|field| field.value.clone())
            .unwrap_or_default()
    }

    fn save_base_dir(&mut self) {
        let value = self.field_value(0);
        let value = value.trim();
        if value.is_empty() {
            self.show_message("Base directory cannot be empty");
            return;
        }
        let path = match PathBuf::from(value).canonicalize() {
            Ok(path) if path.is_dir() => path,
            _ => {
                self.show_message(format!("{value} is not a directory"));
                return;
            }
        };

        self.config.base_dir = Some(path.clone());
        if let Err(err) = self.config.save(&self.config_path) {
            warn!(error = %err, "Failed to save config");
            self.show_message(format!("Failed to save config: {err:#}"));
            return;
        }
        info!(base_dir = %path.display(), "Base directory saved");
        self.root = path;
        self.close_form();
        self.start_rescan();
    }

    fn save_credential(&mut self) {
        let username = self.field_value(0);
        let secret = self.field_value(1);
        if username.trim().is_empty() || secret.is_empty() {
            self.show_message("Username and secret are required");
            return;
        }
        match self.context.submit_credential(username.trim(), &secret) {
            Ok(()) => {
                self.close_form();
                self.show_message(format!("Credential stored for {}", username.trim()));
            }
            Err(err) => {
                warn!(error = %err, "Failed to store credential");
                self.show_message(format!("Failed to store credential: {err}"));
            }
        }
    }
}
