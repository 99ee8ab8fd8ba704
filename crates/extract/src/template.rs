//! URL templating for links to companion tools.
//!
//! The breeding calculator link is derived from a pal's internal code using a
//! user-configurable [upon] template, so a change on the wiki's side (or a
//! switch to another calculator) is a configuration change rather than a
//! code change.

use crate::error::{Error, ErrorKind, Result};
use crate::url::Site;
use exn::ResultExt;
use std::str::FromStr;
use upon::{Engine, Template};
use ::url::form_urlencoded;

/// A compiled URL template.
///
/// Constructed via [`FromStr`], which compiles the template eagerly so that
/// syntax errors surface when the extractor is built rather than per page.
///
/// ```rust
/// use paldeck_extract::{Site, UrlTemplate};
/// let template: UrlTemplate = "{{ origin }}/{{ locale }}/Breed?child={{ code }}".parse().unwrap();
/// let url = template.render(&Site::default(), "SheepBall").unwrap();
/// assert_eq!(url, "https://paldb.cc/en/Breed?child=SheepBall");
/// ```
pub struct UrlTemplate {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl FromStr for UrlTemplate {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let engine = Engine::new();
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template(s.to_string()))?;
        Ok(Self { engine, template })
    }
}
impl std::fmt::Debug for UrlTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlTemplate").finish_non_exhaustive()
    }
}
impl UrlTemplate {
    /// Renders the template for one code.
    ///
    /// The code is percent-encoded for use in a query string before it is
    /// substituted. The result may still be relative, depending on the
    /// template.
    pub fn render(&self, site: &Site, code: &str) -> Result<String> {
        let encoded: String = form_urlencoded::byte_serialize(code.as_bytes()).collect();
        let url = self
            .template
            .render(
                &self.engine,
                upon::value! {
                    origin: site.origin.trim_end_matches('/'),
                    locale: site.locale.as_str(),
                    code: encoded,
                },
            )
            .to_string()
            .or_raise(|| ErrorKind::Template(code.to_string()))?;
        Ok(url.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_default_template() {
        let site = Site::default();
        let template: UrlTemplate = site.breeding_url_template.parse().unwrap();
        assert_eq!(template.render(&site, "PinkCat").unwrap(), "https://paldb.cc/en/Breed?child=PinkCat");
    }

    #[test]
    fn test_code_is_percent_encoded() {
        let site = Site::default();
        let template: UrlTemplate = site.breeding_url_template.parse().unwrap();
        assert_eq!(template.render(&site, "Pink Cat&x=1").unwrap(), "https://paldb.cc/en/Breed?child=Pink+Cat%26x%3D1");
    }

    #[test]
    fn test_rejects_invalid_template() {
        let result = "{{ origin ".parse::<UrlTemplate>();
        assert!(matches!(result.map_err(|e| (*e).clone()), Err(ErrorKind::Template(_))));
    }

    #[test]
    fn test_unknown_variable_fails_at_render() {
        let template: UrlTemplate = "{{ nope }}".parse().unwrap();
        assert!(template.render(&Site::default(), "X").is_err());
    }
}
