use borderd_rest::rest::parser::{Feed, ParseError, Parser, parse_request};
use borderd_rest::rest::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET /node HTTP/1.1\r\nHost: borderd\r\n\r\n";
    let (parsed, consumed) = parse_request(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/node");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.headers.get("Host").unwrap(), "borderd");
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_request_with_body() {
    let req = b"POST /node HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    let (parsed, consumed) = parse_request(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.body, b"hello".to_vec());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_incomplete_headers() {
    let req = b"GET /node HTTP/1.1\r\nHost: borderd\r\n";
    assert!(matches!(parse_request(req), Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_incomplete_body() {
    let req = b"POST /node HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello";
    assert!(matches!(parse_request(req), Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_invalid_method() {
    let req = b"FROB /node HTTP/1.1\r\n\r\n";
    assert!(matches!(parse_request(req), Err(ParseError::InvalidMethod)));
}

#[test]
fn test_parse_malformed_header() {
    let req = b"GET /node HTTP/1.1\r\nBrokenHeader\r\n\r\n";
    assert!(matches!(parse_request(req), Err(ParseError::InvalidHeader)));
}

#[test]
fn test_parse_invalid_content_length() {
    let req = b"POST /node HTTP/1.1\r\nContent-Length: abc\r\n\r\n";
    assert!(matches!(parse_request(req), Err(ParseError::InvalidContentLength)));
}

#[test]
fn test_request_header_lookup() {
    let req = b"GET /node HTTP/1.1\r\nAccept: application/json\r\nContent-Length: 0\r\n\r\n";
    let (parsed, _) = parse_request(req).unwrap();

    assert_eq!(parsed.header("Accept"), Some("application/json"));
    assert_eq!(parsed.header("X-Missing"), None);
    assert_eq!(parsed.content_length(), 0);
}

#[test]
fn test_feed_complete_request_in_one_chunk() {
    let mut parser = Parser::new();
    match parser.feed(b"GET /node/state HTTP/1.1\r\n\r\n").unwrap() {
        Feed::Complete(req) => {
            assert_eq!(req.method, Method::GET);
            assert_eq!(req.path, "/node/state");
        }
        Feed::NeedMore => panic!("request should be complete"),
    }
}

#[test]
fn test_feed_request_across_three_chunks() {
    let mut parser = Parser::new();
    assert!(matches!(parser.feed(b"GET /diagnostics HT").unwrap(), Feed::NeedMore));
    assert!(matches!(parser.feed(b"TP/1.1\r\nHost: borderd\r\n").unwrap(), Feed::NeedMore));
    match parser.feed(b"\r\n").unwrap() {
        Feed::Complete(req) => assert_eq!(req.path, "/diagnostics"),
        Feed::NeedMore => panic!("request should be complete"),
    }
}

#[test]
fn test_feed_body_arrives_after_headers() {
    let mut parser = Parser::new();
    assert!(matches!(
        parser.feed(b"POST /node HTTP/1.1\r\nContent-Length: 4\r\n\r\n").unwrap(),
        Feed::NeedMore
    ));
    match parser.feed(b"abcd").unwrap() {
        Feed::Complete(req) => assert_eq!(req.body, b"abcd".to_vec()),
        Feed::NeedMore => panic!("request should be complete"),
    }
}

#[test]
fn test_feed_malformed_request_is_an_error() {
    let mut parser = Parser::new();
    let result = parser.feed(b"FROB /node HTTP/1.1\r\n\r\n");
    assert_eq!(result.unwrap_err(), ParseError::InvalidMethod);
}

#[test]
fn test_feed_rejects_oversized_request() {
    let mut parser = Parser::new();
    // Header bytes that never terminate, larger than the buffer cap.
    let junk = vec![b'a'; 17 * 1024];
    assert_eq!(parser.feed(&junk).unwrap_err(), ParseError::TooLarge);
}

#[test]
fn test_feed_rejects_oversized_request_fed_in_chunks() {
    let mut parser = Parser::new();
    let chunk = vec![b'a'; 1024];
    let mut result = Ok(());
    for _ in 0..20 {
        match parser.feed(&chunk) {
            Ok(Feed::NeedMore) => continue,
            Ok(Feed::Complete(_)) => panic!("junk must not parse"),
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }
    assert_eq!(result.unwrap_err(), ParseError::TooLarge);
}
