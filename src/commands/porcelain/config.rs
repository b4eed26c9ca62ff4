use crate::areas::config::ConfigKey;
use crate::areas::repository::Repository;

impl Repository {
    /// Print `key`, or set it when `value` is given; `list` prints every key
    pub fn config(&self, key: &str, value: Option<&str>) -> anyhow::Result<()> {
        if key == "list" || key == "--list" {
            for (key, value) in self.identity().list()? {
                writeln!(self.writer(), "{}={}", key.as_str(), value)?;
            }
            return Ok(());
        }

        let key = ConfigKey::try_from(key)?;

        match value {
            Some(value) => self.identity().set(key, value),
            None => {
                if let Some(value) = self.identity().get(key)? {
                    writeln!(self.writer(), "{}", value)?;
                }
                Ok(())
            }
        }
    }
}
