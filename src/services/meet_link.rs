use rand::distributions::Alphanumeric;
use rand::Rng;

pub trait MeetingLinkProvider: Send + Sync {
    fn generate(&self) -> String;
}

/// Google-Meet shaped links built from a random ten character code.
pub struct RandomMeetLink {
    base_url: String,
}

impl RandomMeetLink {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl MeetingLinkProvider for RandomMeetLink {
    fn generate(&self) -> String {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();
        format!("{}/{}-{}-{}", self.base_url, code, &code[..3], &code[3..6])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_shape() {
        let provider = RandomMeetLink::new("https://meet.google.com/".to_string());
        let link = provider.generate();

        let path = link.strip_prefix("https://meet.google.com/").unwrap();
        let parts: Vec<&str> = path.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 10);
        assert_eq!(parts[1], &parts[0][..3]);
        assert_eq!(parts[2], &parts[0][3..6]);
        assert!(parts[0].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_links_differ() {
        let provider = RandomMeetLink::new("https://meet.example.com".to_string());
        assert_ne!(provider.generate(), provider.generate());
    }
}
