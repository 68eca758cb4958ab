use portico_core::User;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserArgError {
    #[error("user name must not be empty")]
    EmptyName,
    #[error("locale after `:` must not be empty")]
    EmptyLocale,
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse `name[:locale]` into a signed-in user.
///
/// # Errors
///
/// Returns an error when the name or an explicit locale is blank.
pub fn parse_user_arg(arg: &str) -> Result<User, UserArgError> {
    let (name, locale) = match arg.split_once(':') {
        Some((name, locale)) => (name.trim(), Some(locale.trim())),
        None => (arg.trim(), None),
    };
    if name.is_empty() {
        return Err(UserArgError::EmptyName);
    }
    let user = User::new(1, name);
    match locale {
        Some("") => Err(UserArgError::EmptyLocale),
        Some(locale) => Ok(user.with_locale(locale)),
        None => Ok(user),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" logout, ,oauth,  locale ");
        assert_eq!(parts, vec!["logout", "oauth", "locale"]);
    }

    #[test]
    fn user_arg_accepts_optional_locale() {
        let plain = parse_user_arg("ada").unwrap();
        assert_eq!(plain.username, "ada");
        assert_eq!(plain.locale(), None);

        let french = parse_user_arg("ada:fr").unwrap();
        assert_eq!(french.locale(), Some("fr"));
    }

    #[test]
    fn user_arg_rejects_blanks() {
        assert_eq!(parse_user_arg(" "), Err(UserArgError::EmptyName));
        assert_eq!(parse_user_arg(":fr"), Err(UserArgError::EmptyName));
        assert_eq!(parse_user_arg("ada:"), Err(UserArgError::EmptyLocale));
    }
}
