use chat_api::{ChatChunk, ChatCompletion};

#[test]
fn completion_content_comes_from_first_choice() {
    let body = r#"{
        "id": "cmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "analysis text"}, "finish_reason": "stop"}
        ],
        "usage": {"total_tokens": 12}
    }"#;

    let completion: ChatCompletion = serde_json::from_str(body).expect("deserialize completion");
    assert_eq!(completion.content(), Some("analysis text"));
}

#[test]
fn completion_tolerates_missing_fields() {
    let completion: ChatCompletion = serde_json::from_str("{}").expect("deserialize empty object");
    assert_eq!(completion.content(), None);

    let body = r#"{"choices":[{"message":{}}]}"#;
    let completion: ChatCompletion = serde_json::from_str(body).expect("deserialize bare choice");
    assert_eq!(completion.content(), None);
}

#[test]
fn chunk_exposes_delta_content_and_finish_reason() {
    let body = r#"{"choices":[{"delta":{"content":"frag"},"finish_reason":null}]}"#;
    let chunk: ChatChunk = serde_json::from_str(body).expect("deserialize chunk");
    assert_eq!(chunk.delta_content(), Some("frag"));
    assert_eq!(chunk.finish_reason(), None);

    let body = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
    let chunk: ChatChunk = serde_json::from_str(body).expect("deserialize terminal chunk");
    assert_eq!(chunk.delta_content(), None);
    assert_eq!(chunk.finish_reason(), Some("stop"));
}

#[test]
fn chunk_with_empty_choices_is_inert() {
    let chunk: ChatChunk = serde_json::from_str(r#"{"choices":[]}"#).expect("deserialize chunk");
    assert_eq!(chunk.delta_content(), None);
    assert_eq!(chunk.finish_reason(), None);
}
