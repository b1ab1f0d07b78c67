//! Integration templates, one per provider and language.

use super::CodeTemplate;

const USAGE_TYPESCRIPT: &str = r#"const answer = await chat("What is the capital of France?");
console.log(answer);"#;

const USAGE_PYTHON: &str = r#"answer = chat("What is the capital of France?")
print(answer)"#;

pub(super) const ANTHROPIC_TYPESCRIPT: CodeTemplate = CodeTemplate {
    install: "npm install @anthropic-ai/sdk",
    env_vars: &["ANTHROPIC_API_KEY=your-api-key"],
    code: r#"import Anthropic from "@anthropic-ai/sdk";

const client = new Anthropic({
  apiKey: process.env.ANTHROPIC_API_KEY,
});

export async function chat(message: string): Promise<string> {
  const response = await client.messages.create({
    model: "claude-sonnet-4-20250514",
    max_tokens: 1024,
    messages: [{ role: "user", content: message }],
  });

  const textBlock = response.content[0];
  if (textBlock.type === "text") {
    return textBlock.text;
  }
  throw new Error("Unexpected response type");
}"#,
    usage: USAGE_TYPESCRIPT,
};

pub(super) const ANTHROPIC_PYTHON: CodeTemplate = CodeTemplate {
    install: "pip install anthropic",
    env_vars: &["ANTHROPIC_API_KEY=your-api-key"],
    code: r#"import anthropic

client = anthropic.Anthropic()

def chat(message: str) -> str:
    response = client.messages.create(
        model="claude-sonnet-4-20250514",
        max_tokens=1024,
        messages=[{"role": "user", "content": message}]
    )
    return response.content[0].text"#,
    usage: USAGE_PYTHON,
};

pub(super) const OPENAI_TYPESCRIPT: CodeTemplate = CodeTemplate {
    install: "npm install openai",
    env_vars: &["OPENAI_API_KEY=your-api-key"],
    code: r#"import OpenAI from "openai";

const client = new OpenAI({
  apiKey: process.env.OPENAI_API_KEY,
});

export async function chat(message: string): Promise<string> {
  const response = await client.chat.completions.create({
    model: "gpt-4o",
    messages: [{ role: "user", content: message }],
  });

  return response.choices[0].message.content || "";
}"#,
    usage: USAGE_TYPESCRIPT,
};

pub(super) const OPENAI_PYTHON: CodeTemplate = CodeTemplate {
    install: "pip install openai",
    env_vars: &["OPENAI_API_KEY=your-api-key"],
    code: r#"from openai import OpenAI

client = OpenAI()

def chat(message: str) -> str:
    response = client.chat.completions.create(
        model="gpt-4o",
        messages=[{"role": "user", "content": message}]
    )
    return response.choices[0].message.content"#,
    usage: USAGE_PYTHON,
};

pub(super) const GOOGLE_TYPESCRIPT: CodeTemplate = CodeTemplate {
    install: "npm install @google/generative-ai",
    env_vars: &["GOOGLE_API_KEY=your-api-key"],
    code: r#"import { GoogleGenerativeAI } from "@google/generative-ai";

const genAI = new GoogleGenerativeAI(process.env.GOOGLE_API_KEY!);

export async function chat(message: string): Promise<string> {
  const model = genAI.getGenerativeModel({ model: "gemini-2.0-flash" });
  const result = await model.generateContent(message);
  return result.response.text();
}"#,
    usage: USAGE_TYPESCRIPT,
};

pub(super) const GOOGLE_PYTHON: CodeTemplate = CodeTemplate {
    install: "pip install google-generativeai",
    env_vars: &["GOOGLE_API_KEY=your-api-key"],
    code: r#"import google.generativeai as genai
import os

genai.configure(api_key=os.environ["GOOGLE_API_KEY"])

def chat(message: str) -> str:
    model = genai.GenerativeModel("gemini-2.0-flash")
    response = model.generate_content(message)
    return response.text"#,
    usage: USAGE_PYTHON,
};
