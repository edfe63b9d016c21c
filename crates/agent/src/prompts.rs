//! Fixed prompt templates, one per LLM call in a turn.

/// Intent classification. The model answers with a single digit, or replies
/// directly when the input is small talk.
pub fn classifier(input_text: &str) -> String {
    format!(
        r#"
### Task:
You are an intelligent assistant designed to help users. Your job is to classify the input into one of the following categories based on the user's request:

- Output `0` if the input is a **numerical problem** that needs solving.
- Output `1` if the input is asking to **retrieve context** or information.
- Output `2` if the input is asking to generate or create a **mindmap** for some topic.
- Output `3` if the input is asking to generate a **MCQ** or **quiz**.
- Output `4` if the input is asking for **more questions similar to the one asked before**.
- Else, the input will be a friendly dialogue and chat as an assistant.

### Classify the following input:
{input_text}
Please output the appropriate category number ONLY. Reply to the input_text as an assistant if it doesn't fall in any category from 0 to 4.
"#
    )
}

/// Rewrite a follow-up into a standalone question.
pub fn condense(chat_history: &str, question: &str) -> String {
    format!(
        "Given the following conversation between a user and an AI assistant and a follow up question from user, \
         rephrase the follow up question to be a standalone question.\n\
         Chat History:\n\
         {chat_history}\n\
         Follow Up Input: {question}\n\
         Standalone question:"
    )
}

/// Answer from retrieved context plus the best-matching page image.
pub fn retrieve_answer(question: &str, context: &str) -> String {
    format!(
        r#"
You are an artificial intelligence assistant designed to help students answer questions related to a chapter on Sound as part of their curriculum.
The assistant is talkative and provides lots of specific details from the image so that the students can understand concepts as clearly as possible.
Question:
{question}
Context:
{context}

Instruction: Based on the image provided, provide a detailed answer to the student. Give more importance to the text.
"#
    )
}

pub fn mindmap(question: &str, context: &str) -> String {
    format!(
        r#"You are a high school teacher loved by all students. Your job is to write xml code for the topic requested by the student and the provided context. Give every node a `text` attribute holding its label and nest subtopics as child elements. Here is the question: {question}. And here is the context: {context}. **Instruction: You'll only give the xml code and nothing else. It should begin with: <?xml version="1.0" encoding="UTF-8"?>**"#
    )
}

pub fn quiz(context: &str, question: &str) -> String {
    format!(
        r#"You are a Quiz Master. Your task is to generate a multiple-choice question (MCQ) based on the given context. You will receive a `context_str` as input, and based on that, create an MCQ in the following JSON format:

{{
  "question": "The generated question based on the context.",
  "choices": [
    "Choice A",
    "Choice B",
    "Choice C",
    "Choice D"
  ],
  "answer": "Correct choice",
  "explanation": "Explanation for why the chosen answer is correct."
}}

Here is the context: {context}
Here is the user query: {question}

Ensure the `choices` array does not use keys and values. Keep it strictly as a list of exactly four strings, and the `answer` must be copied exactly from one of the choices. Ensure that the question, answer, and explanation are accurate based on the `context_str` provided. **Instruction: Strictly output only the json object and nothing else.**"#
    )
}

/// Two harder variants of a question with the same concepts and formulas.
pub fn similar(question: &str) -> String {
    format!(
        "You're an exam paper setter. You are supposed to generate two advanced questions on the concepts \
         which are being used in the following question. DO NOT change the concept or formulas required. \
         You are only allowed to make the problem more difficult to understand or computationally harder \
         to solve via pen and paper. Here's the question: {question}."
    )
}
